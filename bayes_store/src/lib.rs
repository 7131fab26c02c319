//! `bayes_store`：模型文档与训练语料的读写。
//!
//! - `codec`：`ModelState` <-> JSON 文档（内存 / 文件）
//! - `corpus`：TSV 训练语料（`category<TAB>text`）
pub mod codec;
pub mod corpus;
pub mod error;

pub use error::StoreError;
