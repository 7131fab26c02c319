use bayes_core::{Error, NaiveBayes};
use bayes_store::{StoreError, codec, corpus::Corpus};
use bayes_tokenizer::{DefaultTokenizer, PatternTokenizer};
use serde_json::json;
use tempfile::tempdir;

fn spam_ham() -> NaiveBayes<DefaultTokenizer> {
    let mut nb = NaiveBayes::new(DefaultTokenizer::new());
    nb.learn("free money today", "spam");
    nb.learn("win a free prize", "spam");
    nb.learn("meeting at noon", "ham");
    nb.learn("project deadline tomorrow", "ham");
    nb
}

#[test]
fn spam_scenario() {
    let nb = spam_ham();
    assert_eq!(nb.categorize("free offer today").unwrap(), "spam");

    let empty = NaiveBayes::new(DefaultTokenizer::new());
    assert!(matches!(
        empty.probabilities("free offer today"),
        Err(Error::UntrainedModel)
    ));
}

#[test]
fn decoded_model_scores_identically() {
    let nb = spam_ham();
    let text = codec::to_json(&nb, false).unwrap();
    let restored = codec::from_json(&text, DefaultTokenizer::new()).unwrap();

    assert_eq!(restored.state(), nb.state());
    for query in ["free offer today", "deadline at noon", "", "完全陌生的文本"] {
        assert_eq!(
            restored.probabilities(query).unwrap(),
            nb.probabilities(query).unwrap()
        );
    }
}

#[test]
fn restored_model_keeps_learning_like_the_original() {
    let mut original = spam_ham();
    let mut restored = codec::decode(codec::encode(&original).unwrap(), DefaultTokenizer::new()).unwrap();

    original.learn("free free lunch", "spam");
    restored.learn("free free lunch", "spam");
    assert_eq!(restored.state(), original.state());
}

#[test]
fn missing_vocabulary_is_malformed() {
    let mut document = codec::encode(&spam_ham()).unwrap();
    document.as_object_mut().unwrap().remove("vocabulary");

    let err = codec::decode(document, DefaultTokenizer::new()).unwrap_err();
    match err {
        StoreError::Model(Error::MalformedModel { field }) => assert_eq!(field, "vocabulary"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn save_and_load_through_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let nb = spam_ham();

    codec::save(&path, &nb, true).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("{\n  \"categories\""));

    let loaded = codec::load(&path, DefaultTokenizer::new()).unwrap();
    assert_eq!(loaded.state(), nb.state());
    assert_eq!(loaded.categorize("win a prize").unwrap(), "spam");
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = codec::load(dir.path().join("absent.json"), DefaultTokenizer::new()).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[test]
fn options_survive_but_the_tokenizer_is_reattached() {
    let mut options = bayes_core::Options::new();
    options.insert("token_pattern".into(), json!("[a-z]+"));
    let mut nb = NaiveBayes::new(PatternTokenizer::new("[a-z]+").unwrap()).options(options);
    nb.learn("cheap pills NOW", "spam");

    let document = codec::encode(&nb).unwrap();
    assert_eq!(document["options"], json!({"token_pattern": "[a-z]+"}));
    assert_eq!(document["vocabulary"], json!(["cheap", "pills"]));

    let pattern = document["options"]["token_pattern"].as_str().unwrap().to_owned();
    let restored = codec::decode(document, PatternTokenizer::new(&pattern).unwrap()).unwrap();
    assert_eq!(restored.tokenize("NOW cheap"), ["cheap"]);
    assert_eq!(restored.state(), nb.state());
}

#[test]
fn corpus_file_trains_a_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corpus.tsv");
    std::fs::write(
        &path,
        "# 垃圾邮件样本\nspam\t免费领取 free money\nham\t明天开会 meeting tomorrow\n",
    )
    .unwrap();

    let corpus = Corpus::from_path(&path).unwrap();
    let mut nb = NaiveBayes::new(DefaultTokenizer::new());
    corpus.train(&mut nb);

    assert_eq!(nb.total_documents(), 2);
    assert_eq!(nb.categorize("免费").unwrap(), "spam");
    assert_eq!(nb.categorize("开会").unwrap(), "ham");
}
