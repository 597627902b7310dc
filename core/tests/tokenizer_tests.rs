use hashrank::tokenizer::{filter_ngram, ngrams, normalize, SimpleTokenizer, Tokenizer};

#[test]
fn it_splits_words_and_punctuation() {
    let toks = SimpleTokenizer.tokenize("COVID-19 spreads; fast.");
    assert_eq!(toks, vec!["COVID", "-", "19", "spreads", ";", "fast", "."]);
}

#[test]
fn it_filters_stopwords() {
    let toks = SimpleTokenizer.tokenize("The quick brown fox and the lazy dog");
    let grams = ngrams(&toks, 1, true, filter_ngram);
    assert!(!grams.contains(&"the".to_string()));
    assert!(!grams.contains(&"and".to_string()));
    assert_eq!(grams, vec!["quick", "brown", "fox", "lazy", "dog"]);
}

#[test]
fn bigrams_never_span_a_filtered_word() {
    let toks = SimpleTokenizer.tokenize("vaccine, trial of children");
    let grams = ngrams(&toks, 2, true, filter_ngram);
    assert_eq!(grams, vec!["vaccine", "trial", "children"]);
}

#[test]
fn uncased_flag_controls_lowercasing() {
    let toks = SimpleTokenizer.tokenize("Spike Protein");
    assert_eq!(ngrams(&toks, 1, false, |_| false), vec!["Spike", "Protein"]);
    assert_eq!(ngrams(&toks, 1, true, |_| false), vec!["spike", "protein"]);
}

#[test]
fn normalize_decomposes_accents() {
    let s = normalize("café");
    assert_eq!(s.chars().count(), 5);
    assert!(s.starts_with("cafe"));
}
