//! `codec`：模型统计量与 JSON 文档互转。
//!
//! 文档固定七个键，写出顺序如下：
//! `categories, doc_count, total_documents, vocabulary, word_count, word_frequency_count, options`
//!
//! 分词器是行为而不是数据，不进入文档；`decode` 时由调用方重新注入。

use std::{fs, path::Path};

use bayes_core::{Error, ModelState, NaiveBayes, tokenizer::Tokenizer};
use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::StoreError;

/// 文档必需的键（按写出与校验顺序）。
pub const STATE_KEYS: [&str; 7] = [
    "categories",
    "doc_count",
    "total_documents",
    "vocabulary",
    "word_count",
    "word_frequency_count",
    "options",
];

/// 模型 -> JSON 文档。
pub fn encode(model: impl AsRef<ModelState>) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(model.as_ref())?)
}

/// 模型 -> JSON 文本；`pretty` 只影响缩进，不影响内容。
pub fn to_json(model: impl AsRef<ModelState>, pretty: bool) -> Result<String, StoreError> {
    let state = model.as_ref();
    let text = if pretty {
        serde_json::to_string_pretty(state)?
    } else {
        serde_json::to_string(state)?
    };
    Ok(text)
}

/// JSON 文档 -> 模型。
///
/// 校验顺序：
/// - 文档必须是对象
/// - 按 `STATE_KEYS` 顺序检查必需字段，报告第一个缺失的字段
/// - 逐字段解析类型
/// - 最后校验计数之间的不变式
///
/// 任一步失败都不会产出模型。多余的键被忽略。
pub fn decode<T>(document: Value, tokenizer: T) -> Result<NaiveBayes<T>, StoreError>
where
    T: Tokenizer,
{
    let Value::Object(mut fields) = document else {
        return Err(StoreError::NotAnObject);
    };
    if let Some(missing) = STATE_KEYS.iter().find(|key| !fields.contains_key(**key)) {
        return Err(Error::MalformedModel {
            field: (*missing).to_owned(),
        }
        .into());
    }

    let vocabulary: Vec<String> = take(&mut fields, "vocabulary")?;
    let words = vocabulary.len();
    let vocabulary: IndexSet<String> = vocabulary.into_iter().collect();
    if vocabulary.len() != words {
        return Err(Error::InconsistentModel("vocabulary 中存在重复 token".to_string()).into());
    }

    let state = ModelState {
        categories: take(&mut fields, "categories")?,
        doc_count: take(&mut fields, "doc_count")?,
        total_documents: take(&mut fields, "total_documents")?,
        vocabulary,
        word_count: take(&mut fields, "word_count")?,
        word_frequency_count: take(&mut fields, "word_frequency_count")?,
        options: take(&mut fields, "options")?,
    };
    let model = NaiveBayes::from_state(state, tokenizer)?;
    debug!(
        categories = model.categories().len(),
        vocabulary = model.vocabulary_len(),
        total_documents = model.total_documents(),
        "模型已解码"
    );
    Ok(model)
}

/// JSON 文本 -> 模型。
pub fn from_json<T>(text: &str, tokenizer: T) -> Result<NaiveBayes<T>, StoreError>
where
    T: Tokenizer,
{
    let document: Value = serde_json::from_str(text)?;
    decode(document, tokenizer)
}

/// 读取模型文件为 JSON 文档（不解码，调用方可先查看 `options`）。
pub fn read_document(path: impl AsRef<Path>) -> Result<Value, StoreError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// 从文件加载模型。
pub fn load<T>(path: impl AsRef<Path>, tokenizer: T) -> Result<NaiveBayes<T>, StoreError>
where
    T: Tokenizer,
{
    let path = path.as_ref();
    let model = decode(read_document(path)?, tokenizer)?;
    debug!(path = %path.display(), "模型已加载");
    Ok(model)
}

/// 把模型写入文件（覆盖已有内容）。
pub fn save(
    path: impl AsRef<Path>,
    model: impl AsRef<ModelState>,
    pretty: bool,
) -> Result<(), StoreError> {
    let path = path.as_ref();
    let text = to_json(model, pretty)?;
    fs::write(path, text).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "模型已保存");
    Ok(())
}

fn take<D>(fields: &mut Map<String, Value>, field: &'static str) -> Result<D, StoreError>
where
    D: DeserializeOwned,
{
    // 必需字段已检查过，这里的 Null 只会来自文档里显式写的 null
    let value = fields.remove(field).unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|source| StoreError::InvalidField {
        field: field.to_owned(),
        source,
    })
}
