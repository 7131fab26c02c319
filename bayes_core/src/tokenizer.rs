//! `tokenizer`：分词契约（text -> 有序 token 序列）。
//!
//! core 只定义契约，不关心具体切分规则；默认实现见 `bayes_tokenizer`。

use indexmap::IndexMap;

/// 分词器：把一段文本切成有序的 token 序列。
///
/// 约定：
/// - 输出是序列而不是集合：同一个词出现几次就返回几次（词频统计依赖这一点）
/// - 空文本返回空序列
/// - 对任意输入都不失败
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// 词频表：token -> 出现次数，按 token 首次出现的顺序排列。
///
/// 顺序决定了新 token 进入词表的先后，因此不能用无序 map。
pub fn frequency_table(tokens: Vec<String>) -> IndexMap<String, u64> {
    let mut table: IndexMap<String, u64> = IndexMap::with_capacity(tokens.len());
    for token in tokens {
        *table.entry(token).or_insert(0) += 1;
    }
    table
}
