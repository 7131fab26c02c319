//! 分词器实现：默认规则分词 + 自定义正则分词。
//!
//! 默认规则（`DefaultTokenizer`）：
//! 1. 保留字符以外的字符一律替换为空格
//!    （保留：`U+0041..=U+044F` 整段，含拉丁、带重音拉丁、希腊、西里尔 `А..я`；ASCII 数字；`_`；
//!    CJK 汉字 `U+4E00..=U+9FA5`；空白）
//! 2. 每个汉字后面插入一个空格：没有空格分词的中文先粗暴地按字切开
//! 3. 按连续的字母/数字/`_` 取词（`×`、组合附加符号等保留字符在这里断开），保留大小写与重复

use std::sync::LazyLock;

use bayes_core::tokenizer::Tokenizer;
use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\x{41}-\x{44F}0-9_\x{4E00}-\x{9FA5}\s]").expect("NON_WORD 正则非法")
});

static IDEOGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{4E00}-\x{9FA5}]").expect("IDEOGRAPH 正则非法"));

static WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]+").expect("WORD_RUN 正则非法"));

/// 默认分词器。
///
/// 注意：空格只插在汉字**之后**，所以 `"abc中文"` 切成 `["abc中", "文"]`。
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl DefaultTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for DefaultTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let cleaned = NON_WORD.replace_all(text, " ");
        let spaced = IDEOGRAPH.replace_all(&cleaned, "${0} ");
        WORD_RUN
            .find_iter(&spaced)
            .map(|m| m.as_str().to_owned())
            .collect()
    }
}

/// 正则分词器：每个非空匹配是一个 token。
///
/// 例如 `\w+` 或 `[a-z]+`；零宽匹配会被丢弃。
#[derive(Debug, Clone)]
pub struct PatternTokenizer {
    pattern: Regex,
}

impl PatternTokenizer {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// 原始正则文本（持久化到 options 时使用）。
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for PatternTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.as_str().to_owned())
            .collect()
    }
}
