//! `bayes_core`：朴素贝叶斯文本分类的纯逻辑层（不做任何 I/O）。
//!
//! 设计目标：
//! - **数据与行为分离**：`ModelState` 只有计数，可完整持久化；`Tokenizer` 是行为，加载时重新注入
//! - **单一写入口**：所有计数只经由 `NaiveBayes::learn` 增长，只增不减
//! - **分词可插拔**：任何 `Fn(&str) -> Vec<String>` 都可以直接当分词器用
pub mod classifier;
pub mod error;
pub mod model;
pub mod tokenizer;

pub use classifier::NaiveBayes;
pub use error::{Error, Result};
pub use model::{ModelState, Options, Score};
pub use tokenizer::Tokenizer;
