use std::{fs, path::Path};

use bayes_core::{NaiveBayes, tokenizer::Tokenizer};
use tracing::debug;

use crate::error::StoreError;

/// 一条带标签的训练样本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub category: String,
    pub text: String,
}

/// TSV 训练语料（简化版）：
///
/// - `category<TAB>text`，text 可以为空（空文本也算一篇文档）
/// - 允许空行与 `#` 开头的注释行
/// - text 里可以再出现 TAB，只按第一个 TAB 切开
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    examples: Vec<Example>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_tsv_str(&s)?;
        debug!(path = %path.display(), examples = corpus.len(), "语料已读取");
        Ok(corpus)
    }

    pub fn from_tsv_str(s: &str) -> Result<Self, StoreError> {
        let mut corpus = Self::new();
        for (idx, line) in s.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((category, text)) = line.split_once('\t') else {
                return Err(StoreError::InvalidLine {
                    line: idx + 1,
                    reason: "缺少 TAB 分隔的 category/text".to_string(),
                });
            };
            let category = category.trim();
            if category.is_empty() {
                return Err(StoreError::InvalidLine {
                    line: idx + 1,
                    reason: "category 为空".to_string(),
                });
            }
            corpus.push(category, text.trim());
        }
        Ok(corpus)
    }

    /// 内置的四条演示样本。
    pub fn sample() -> Self {
        let mut corpus = Self::new();
        corpus.push("spam", "Get a free laptop today");
        corpus.push("spam", "Hey, did you see the new discount offer?");
        corpus.push("not spam", "Meeting at 10 am tomorrow");
        corpus.push("not spam", "Reminder: pay rent by end of the month");
        corpus
    }

    pub fn push(&mut self, category: impl Into<String>, text: impl Into<String>) {
        self.examples.push(Example {
            category: category.into(),
            text: text.into(),
        });
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// 按文件顺序把全部样本学进模型。
    pub fn train<T>(&self, model: &mut NaiveBayes<T>)
    where
        T: Tokenizer,
    {
        for e in &self.examples {
            model.learn(&e.text, &e.category);
        }
        debug!(
            examples = self.examples.len(),
            categories = model.categories().len(),
            vocabulary = model.vocabulary_len(),
            "语料训练完成"
        );
    }
}
