use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // A run of letters/digits/marks, or any single non-space, non-control character.
    static ref TOKEN_RE: Regex =
        Regex::new(r"(?u)([\p{L}\p{N}\p{M}]+)|([^\p{Z}\p{C}])").expect("valid regex");
    static ref PUNCT_RE: Regex = Regex::new(r"(?u)^\p{P}+$").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn","couldn't",
            "d","did","didn","didn't","do","does","doesn","doesn't","doing","don","don't","down","during",
            "each","few","for","from","further",
            "had","hadn","hadn't","has","hasn","hasn't","have","haven","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn","isn't","it","it's","its","itself",
            "just","let's","ll","m","ma","me","mightn","more","most","mustn","mustn't","my","myself",
            "needn","no","nor","not","now","o","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "re","s","same","shan","she","she'd","she'll","she's","should","shouldn","shouldn't","so","some","such",
            "t","than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","wasn't","we","we'd","we'll","we're","we've","were","weren","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","will","with","won","won't","would","wouldn","wouldn't",
            "y","you","you'd","you'll","you're","you've","your","yours","yourself","yourselves",
            "'s","'re","'ve","n't","'d","'ll","``","''"
        ];
        words.iter().copied().collect()
    };
}

/// Splits text into an ordered sequence of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Alphanumeric runs plus single-character punctuation tokens; case is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        TOKEN_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }
}

/// Canonical decomposition (NFD), applied to query text before tokenizing.
pub fn normalize(text: &str) -> String {
    text.nfd().collect()
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// True when a single word should not take part in any n-gram:
/// punctuation-only tokens and stopwords.
pub fn filter_word(word: &str) -> bool {
    let word = normalize(word);
    PUNCT_RE.is_match(&word) || is_stopword(&word.to_lowercase())
}

/// Skip an n-gram if any of its words is filtered.
pub fn filter_ngram(gram: &[String]) -> bool {
    gram.iter().any(|w| filter_word(w))
}

/// All n-grams of length `1..=n`, ordered by start position then length,
/// joined with a single space. Grams for which `skip` returns true are dropped.
pub fn ngrams<F>(tokens: &[String], n: usize, uncased: bool, skip: F) -> Vec<String>
where
    F: Fn(&[String]) -> bool,
{
    let words: Vec<String> = if uncased {
        tokens.iter().map(|t| t.to_lowercase()).collect()
    } else {
        tokens.to_vec()
    };
    let mut grams = Vec::new();
    for start in 0..words.len() {
        let end_max = (start + n).min(words.len());
        for end in start + 1..=end_max {
            let gram = &words[start..end];
            if skip(gram) {
                continue;
            }
            grams.push(gram.join(" "));
        }
    }
    grams
}
