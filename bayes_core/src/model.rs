use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::{Error, Result};

/// 单个计数允许的上限（2^53）：超过后 f64 无法精确表示，`learn` 继续累加也可能溢出。
pub const MAX_COUNT: u64 = 1 << 53;

/// 可序列化的不透明配置（不含分词器，分词器是行为而不是数据）。
pub type Options = IndexMap<String, serde_json::Value>;

/// 模型的全部统计量。
///
/// 字段顺序即持久化文档的键顺序；所有 map 都保留插入顺序，
/// 保证同样的训练序列写出完全相同的文档。
///
/// 不变式（见 `validate`）：
/// - `categories` 无重复，且与三个按类别索引的 map 的键集合一致
/// - `total_documents == Σ doc_count`，且每个类别至少一篇文档
/// - `word_count[c] == Σ word_frequency_count[c]`，频次表里没有 0
/// - 频次表中的 token 都在 `vocabulary` 里
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelState {
    /// 类别（按首次出现顺序）
    pub categories: Vec<String>,
    /// 每个类别的训练文档数
    pub doc_count: IndexMap<String, u64>,
    pub total_documents: u64,
    /// 见过的全部 token（按首次出现顺序），`|V|` 是所有类别共享的平滑参数
    pub vocabulary: IndexSet<String>,
    /// 每个类别的 token 总出现次数（含重复）
    pub word_count: IndexMap<String, u64>,
    /// 类别 -> (token -> 出现次数)
    pub word_frequency_count: IndexMap<String, IndexMap<String, u64>>,
    pub options: Options,
}

/// 某个类别的后验对数概率（未归一化）。
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub category: String,
    /// `ln P(c) + Σ f * ln P(t | c)`，总是 <= 0
    pub log_probability: f64,
}

impl ModelState {
    /// 是否已经可以打分（至少一个类别、至少一篇文档）。
    pub fn is_trained(&self) -> bool {
        self.total_documents > 0 && !self.categories.is_empty()
    }

    /// 登记类别；已存在时什么也不做。返回是否为新类别。
    pub(crate) fn register(&mut self, category: &str) -> bool {
        if self.doc_count.contains_key(category) {
            return false;
        }
        self.categories.push(category.to_owned());
        self.doc_count.insert(category.to_owned(), 0);
        self.word_count.insert(category.to_owned(), 0);
        self.word_frequency_count
            .insert(category.to_owned(), IndexMap::new());
        true
    }

    /// Laplace 平滑后的 `P(token | category)`；类别未知时返回 `None`。
    pub fn token_probability(&self, token: &str, category: &str) -> Option<f64> {
        let frequencies = self.word_frequency_count.get(category)?;
        let word_count = self.word_count.get(category).copied().unwrap_or(0);
        let count = frequencies.get(token).copied().unwrap_or(0);
        Some(smoothed(count, word_count, self.vocabulary.len()))
    }

    /// 检查全部不变式。
    pub fn validate(&self) -> Result<()> {
        let mut seen: IndexSet<&str> = IndexSet::with_capacity(self.categories.len());
        for category in &self.categories {
            if !seen.insert(category.as_str()) {
                return Err(inconsistent(format!("类别 `{category}` 重复登记")));
            }
        }
        same_keys("doc_count", &seen, self.doc_count.keys())?;
        same_keys("word_count", &seen, self.word_count.keys())?;
        same_keys("word_frequency_count", &seen, self.word_frequency_count.keys())?;

        if let Some((category, _)) = self.doc_count.iter().find(|(_, n)| **n == 0) {
            return Err(inconsistent(format!("类别 `{category}` 的文档数为 0")));
        }
        let documents = checked_sum(self.doc_count.values())
            .ok_or_else(|| inconsistent("doc_count 求和溢出".to_string()))?;
        if documents > MAX_COUNT {
            return Err(inconsistent(format!("文档总数 {documents} 超过上限 {MAX_COUNT}")));
        }
        if documents != self.total_documents {
            return Err(inconsistent(format!(
                "total_documents = {}，但 doc_count 之和为 {documents}",
                self.total_documents
            )));
        }

        for (category, frequencies) in &self.word_frequency_count {
            let expected = self.word_count.get(category).copied().unwrap_or(0);
            let actual = checked_sum(frequencies.values())
                .ok_or_else(|| inconsistent(format!("类别 `{category}` 的词频求和溢出")))?;
            if actual > MAX_COUNT {
                return Err(inconsistent(format!(
                    "类别 `{category}` 的词频之和 {actual} 超过上限 {MAX_COUNT}"
                )));
            }
            if expected != actual {
                return Err(inconsistent(format!(
                    "类别 `{category}` 的 word_count = {expected}，但词频之和为 {actual}"
                )));
            }
            for (token, &n) in frequencies {
                if n == 0 {
                    return Err(inconsistent(format!(
                        "类别 `{category}` 中 token `{token}` 的频次为 0"
                    )));
                }
                if !self.vocabulary.contains(token) {
                    return Err(inconsistent(format!("token `{token}` 不在词表中")));
                }
            }
        }
        Ok(())
    }
}

impl AsRef<ModelState> for ModelState {
    fn as_ref(&self) -> &ModelState {
        self
    }
}

/// `(count + 1) / (word_count + |V|)`，全程用 f64 计算，不会整数溢出。
///
/// 只学过空文本时分母为 0：此时按 1 处理，所有 token 贡献 `ln 1 = 0`，排名退化为先验。
pub(crate) fn smoothed(count: u64, word_count: u64, vocabulary: usize) -> f64 {
    let denominator = (word_count as f64 + vocabulary as f64).max(1.0);
    (count as f64 + 1.0) / denominator
}

fn checked_sum<'a>(mut values: impl Iterator<Item = &'a u64>) -> Option<u64> {
    values.try_fold(0u64, |acc, &n| acc.checked_add(n))
}

fn same_keys<'a>(
    name: &str,
    categories: &IndexSet<&str>,
    keys: impl ExactSizeIterator<Item = &'a String>,
) -> Result<()> {
    if keys.len() != categories.len() {
        return Err(inconsistent(format!(
            "{name} 有 {} 个类别，categories 有 {} 个",
            keys.len(),
            categories.len()
        )));
    }
    for key in keys {
        if !categories.contains(key.as_str()) {
            return Err(inconsistent(format!("{name} 中的类别 `{key}` 未登记")));
        }
    }
    Ok(())
}

fn inconsistent(reason: String) -> Error {
    Error::InconsistentModel(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained() -> ModelState {
        let mut state = ModelState::default();
        state.register("spam");
        state.doc_count.insert("spam".into(), 1);
        state.total_documents = 1;
        state.vocabulary.insert("free".into());
        state.word_count.insert("spam".into(), 2);
        state.word_frequency_count["spam"].insert("free".into(), 2);
        state
    }

    #[test]
    fn empty_state_is_valid_but_untrained() {
        let state = ModelState::default();
        assert!(state.validate().is_ok());
        assert!(!state.is_trained());
    }

    #[test]
    fn register_is_idempotent() {
        let mut state = ModelState::default();
        assert!(state.register("ham"));
        assert!(!state.register("ham"));
        assert_eq!(state.categories, vec!["ham".to_string()]);
        assert_eq!(state.doc_count["ham"], 0);
    }

    #[test]
    fn consistent_state_passes() {
        let state = trained();
        assert!(state.validate().is_ok());
        assert!(state.is_trained());
    }

    #[test]
    fn total_documents_mismatch_is_rejected() {
        let mut state = trained();
        state.total_documents = 3;
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn word_count_mismatch_is_rejected() {
        let mut state = trained();
        state.word_count["spam"] = 5;
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn zero_frequency_entry_is_rejected() {
        let mut state = trained();
        state.vocabulary.insert("win".into());
        state.word_frequency_count["spam"].insert("win".into(), 0);
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn token_outside_vocabulary_is_rejected() {
        let mut state = trained();
        state.vocabulary.clear();
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn unregistered_category_key_is_rejected() {
        let mut state = trained();
        state.word_count.insert("ham".into(), 0);
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn duplicate_category_is_rejected() {
        let mut state = trained();
        state.categories.push("spam".into());
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn smoothing_stays_in_unit_interval() {
        let state = trained();
        let seen = state.token_probability("free", "spam").unwrap();
        let unseen = state.token_probability("prize", "spam").unwrap();
        assert_eq!(seen, 3.0 / 3.0);
        assert_eq!(unseen, 1.0 / 3.0);
        assert!(state.token_probability("free", "ham").is_none());
    }

    #[test]
    fn empty_denominator_is_clamped() {
        assert_eq!(smoothed(0, 0, 0), 1.0);
    }

    #[test]
    fn huge_counts_do_not_overflow_smoothing() {
        let p = smoothed(u64::MAX, u64::MAX, usize::MAX);
        assert!(p > 0.0 && p <= 1.0);
    }

    #[test]
    fn counts_beyond_the_cap_are_rejected() {
        let mut state = trained();
        state.word_count["spam"] = u64::MAX;
        state.word_frequency_count["spam"]["free"] = u64::MAX;
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));

        let mut state = trained();
        state.word_count["spam"] = MAX_COUNT + 1;
        state.word_frequency_count["spam"]["free"] = MAX_COUNT + 1;
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));

        let mut state = trained();
        state.doc_count["spam"] = MAX_COUNT + 1;
        state.total_documents = MAX_COUNT + 1;
        assert!(matches!(state.validate(), Err(Error::InconsistentModel(_))));
    }

    #[test]
    fn counts_at_the_cap_are_accepted() {
        let mut state = trained();
        state.word_count["spam"] = MAX_COUNT;
        state.word_frequency_count["spam"]["free"] = MAX_COUNT;
        assert!(state.validate().is_ok());
    }
}
