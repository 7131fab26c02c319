use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// 缺字段、统计不一致等模型层错误
    #[error(transparent)]
    Model(#[from] bayes_core::Error),

    #[error("模型文档必须是 JSON 对象")]
    NotAnObject,

    /// 字段存在但类型不对
    #[error("模型文档字段 '{field}' 无效：{source}")]
    InvalidField {
        field: String,
        source: serde_json::Error,
    },

    #[error("JSON 解析失败：{0}")]
    Json(#[from] serde_json::Error),

    #[error("读写 {} 失败：{source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// 语料第 `line` 行（从 1 开始）格式错误
    #[error("语料第 {line} 行无效：{reason}")]
    InvalidLine { line: usize, reason: String },
}
