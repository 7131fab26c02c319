use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use bayes_core::{NaiveBayes, Options, tokenizer::Tokenizer};
use bayes_store::{codec, corpus::Corpus};
use bayes_tokenizer::{DefaultTokenizer, PatternTokenizer};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(name = "bayes_cli", version, about = "朴素贝叶斯文本分类（逐行输入，输出类别排名）")]
struct Opt {
    /// 训练语料（TSV：category<TAB>text）
    #[clap(long)]
    corpus: Option<PathBuf>,

    /// 先加载已保存的模型（JSON）
    #[clap(long)]
    model: Option<PathBuf>,

    /// 训练完成后把模型写到该路径
    #[clap(long)]
    save: Option<PathBuf>,

    /// 保存时使用缩进格式
    #[clap(long)]
    pretty: bool,

    /// 自定义分词正则：每个匹配是一个 token
    #[clap(long)]
    token_pattern: Option<String>,

    /// 判定用的目标类别
    #[clap(long, default_value = "spam")]
    positive: String,
}

/// CLI 可选的分词器。
enum CliTokenizer {
    Default(DefaultTokenizer),
    Pattern(PatternTokenizer),
}

impl Tokenizer for CliTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        match self {
            CliTokenizer::Default(t) => t.tokenize(text),
            CliTokenizer::Pattern(t) => t.tokenize(text),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opt = Opt::parse();
    let model = build_model(&opt)?;
    if let Some(path) = &opt.save {
        codec::save(path, &model, opt.pretty)
            .with_context(|| format!("无法保存模型到 {}", path.display()))?;
        info!(path = %path.display(), "模型已保存");
    }
    repl(&model, &opt.positive)?;
    Ok(())
}

fn build_model(opt: &Opt) -> anyhow::Result<NaiveBayes<CliTokenizer>> {
    let mut model = match &opt.model {
        Some(path) => {
            let document = codec::read_document(path)?;
            // 命令行没指定正则时沿用模型里记录的正则
            let pattern = opt
                .token_pattern
                .clone()
                .or_else(|| stored_pattern(&document));
            let model = codec::decode(document, make_tokenizer(pattern.as_deref())?)
                .with_context(|| format!("无法加载模型 {}", path.display()))?;
            let options = tokenizer_options(model.state().options.clone(), pattern.as_deref());
            model.options(options)
        }
        None => {
            let pattern = opt.token_pattern.as_deref();
            NaiveBayes::new(make_tokenizer(pattern)?)
                .options(tokenizer_options(Options::new(), pattern))
        }
    };

    match (&opt.corpus, &opt.model) {
        (Some(path), _) => {
            let corpus = Corpus::from_path(path)?;
            corpus.train(&mut model);
            info!(path = %path.display(), examples = corpus.len(), "语料训练完成");
        }
        (None, None) => {
            Corpus::sample().train(&mut model);
            info!("未指定语料与模型，使用内置演示样本");
        }
        (None, Some(_)) => {}
    }
    Ok(model)
}

fn make_tokenizer(pattern: Option<&str>) -> anyhow::Result<CliTokenizer> {
    Ok(match pattern {
        Some(p) => CliTokenizer::Pattern(
            PatternTokenizer::new(p).with_context(|| format!("分词正则无效：{p}"))?,
        ),
        None => CliTokenizer::Default(DefaultTokenizer::new()),
    })
}

fn stored_pattern(document: &Value) -> Option<String> {
    document
        .get("options")?
        .get("token_pattern")?
        .as_str()
        .map(str::to_owned)
}

/// 在 options 中记录分词方式，保存的模型能说明自己是怎么训练的。
fn tokenizer_options(mut options: Options, pattern: Option<&str>) -> Options {
    match pattern {
        Some(p) => {
            options.insert("tokenizer".into(), Value::from("pattern"));
            options.insert("token_pattern".into(), Value::from(p));
        }
        None => {
            options.insert("tokenizer".into(), Value::from("default"));
            options.shift_remove("token_pattern");
        }
    }
    options
}

fn repl<T: Tokenizer>(model: &NaiveBayes<T>, positive: &str) -> io::Result<()> {
    let mut out = io::stdout();
    let mut line = String::new();
    writeln!(
        out,
        "bayes-rs demo | 类别: [{}] | 文档: {} | 词表: {}",
        model.categories().join(", "),
        model.total_documents(),
        model.vocabulary_len()
    )?;
    writeln!(out, "输入一行文本后回车进行分类。输入 :q 退出。")?;
    out.flush()?;

    loop {
        line.clear();
        write!(out, "text> ")?;
        out.flush()?;
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == ":q" || input == ":quit" || input == ":exit" {
            break;
        }

        let scores = match model.probabilities(input) {
            Ok(scores) => scores,
            Err(e) => {
                writeln!(out, "(无法分类：{e})")?;
                continue;
            }
        };
        for (i, s) in scores.iter().enumerate() {
            writeln!(out, "{}. {}\t{:.4}", i + 1, s.category, s.log_probability)?;
        }
        if scores.first().is_some_and(|s| s.category == positive) {
            writeln!(out, "判定：很可能是 {positive}")?;
        } else {
            writeln!(out, "判定：不是 {positive}")?;
        }
    }

    Ok(())
}
