//! `classifier`：多项式朴素贝叶斯（Laplace 加一平滑）。
//!
//! - `learn`：把一段文本的词频累加进对应类别（只增不减）
//! - `probabilities`：对所有类别计算后验对数概率并降序排列
//! - `categorize`：取排名第一的类别
//!
//! 打分用自然对数求和而不是概率连乘，长文本也不会下溢。

use std::fmt;

use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    model::{ModelState, Options, Score, smoothed},
    tokenizer::{Tokenizer, frequency_table},
};

/// 分类器：持有分词器（行为）与统计量（数据）。
///
/// 单线程、单所有者；需要并发训练/查询时由调用方在外部串行化访问。
pub struct NaiveBayes<T> {
    /// 分词器（不参与持久化，加载时重新注入）
    tokenizer: T,
    /// 全部计数；只能经由 `learn` 修改
    state: ModelState,
}

impl<T> NaiveBayes<T>
where
    T: Tokenizer,
{
    /// 空模型：零类别、零文档、空词表。
    pub fn new(tokenizer: T) -> Self {
        Self {
            tokenizer,
            state: ModelState::default(),
        }
    }

    /// 从已有统计量重建模型；不变式不成立时失败，不会得到半成品。
    pub fn from_state(state: ModelState, tokenizer: T) -> Result<Self> {
        state.validate()?;
        Ok(Self { tokenizer, state })
    }

    /// 设置可持久化的不透明配置。
    pub fn options(mut self, options: Options) -> Self {
        self.state.options = options;
        self
    }

    /// 用当前分词器切分文本。
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.tokenize(text)
    }

    /// 学习一条样本。
    ///
    /// 空文本也是合法样本：文档数照常增加，词表不变。
    pub fn learn(&mut self, text: &str, category: &str) {
        let state = &mut self.state;
        if state.register(category) {
            debug!(category, "登记新类别");
        }
        // register 之后三个按类别索引的 map 都已有该键
        state.doc_count[category] += 1;
        state.total_documents += 1;

        let table = frequency_table(self.tokenizer.tokenize(text));
        let frequencies = &mut state.word_frequency_count[category];
        let mut added = 0u64;
        for (token, n) in table {
            if state.vocabulary.get_index_of(&token).is_none() {
                state.vocabulary.insert(token.clone());
            }
            *frequencies.entry(token).or_insert(0) += n;
            added += n;
        }
        state.word_count[category] += added;

        trace!(
            category,
            tokens = added,
            vocabulary = state.vocabulary.len(),
            total_documents = state.total_documents,
            "learn"
        );
    }

    /// 依次学习多条 `(text, category)` 样本，等价于逐条调用 `learn`。
    pub fn learn_many<I, S, C>(&mut self, examples: I)
    where
        I: IntoIterator<Item = (S, C)>,
        S: AsRef<str>,
        C: AsRef<str>,
    {
        for (text, category) in examples {
            self.learn(text.as_ref(), category.as_ref());
        }
    }

    /// 所有类别的后验对数概率，降序排列。
    ///
    /// 分数相同的类别保持登记顺序（稳定排序）。未训练的模型返回 `UntrainedModel`。
    pub fn probabilities(&self, text: &str) -> Result<Vec<Score>> {
        let state = &self.state;
        if !state.is_trained() {
            return Err(Error::UntrainedModel);
        }

        let table = frequency_table(self.tokenizer.tokenize(text));
        let total = state.total_documents as f64;
        let vocabulary = state.vocabulary.len();

        let mut scores: Vec<Score> = Vec::with_capacity(state.categories.len());
        for category in &state.categories {
            let documents = state.doc_count.get(category).copied().unwrap_or(0);
            let word_count = state.word_count.get(category).copied().unwrap_or(0);
            let frequencies = state.word_frequency_count.get(category);

            let mut log_probability = (documents as f64 / total).ln();
            for (token, &n) in &table {
                let count = frequencies
                    .and_then(|f| f.get(token))
                    .copied()
                    .unwrap_or(0);
                log_probability += n as f64 * smoothed(count, word_count, vocabulary).ln();
            }
            scores.push(Score {
                category: category.clone(),
                log_probability,
            });
        }

        // sort_by 是稳定排序：同分保持登记顺序
        scores.sort_by(|a, b| b.log_probability.total_cmp(&a.log_probability));
        Ok(scores)
    }

    /// 最可能的类别。
    pub fn categorize(&self, text: &str) -> Result<String> {
        self.probabilities(text)?
            .into_iter()
            .next()
            .map(|score| score.category)
            .ok_or(Error::UntrainedModel)
    }

    /// Laplace 平滑后的 `P(token | category)`，取值在 (0, 1]。
    pub fn token_probability(&self, token: &str, category: &str) -> Result<f64> {
        if !self.state.is_trained() {
            return Err(Error::UntrainedModel);
        }
        self.state
            .token_probability(token, category)
            .ok_or_else(|| Error::UnknownCategory(category.to_owned()))
    }
}

impl<T> NaiveBayes<T> {
    /// 只读统计量（持久化走这里）。
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn categories(&self) -> &[String] {
        &self.state.categories
    }

    pub fn vocabulary_len(&self) -> usize {
        self.state.vocabulary.len()
    }

    pub fn total_documents(&self) -> u64 {
        self.state.total_documents
    }

    /// 拆回 (统计量, 分词器)。
    pub fn into_parts(self) -> (ModelState, T) {
        (self.state, self.tokenizer)
    }
}

impl<T> AsRef<ModelState> for NaiveBayes<T> {
    fn as_ref(&self) -> &ModelState {
        &self.state
    }
}

impl<T> fmt::Debug for NaiveBayes<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaiveBayes")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
