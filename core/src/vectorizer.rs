//! Query text -> sparse TF-IDF vector over the hashed feature space.
//!
//! ```text
//! tfidf = ln(1 + tf) * max(0, ln((N - df + 0.5) / (df + 0.5)))
//! ```

use crate::hasher::FeatureHasher;
use crate::tokenizer::{filter_ngram, ngrams, normalize, Tokenizer};
use crate::Bucket;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sublinear term weight `ln(1 + count)`.
pub fn tf(count: u32) -> f32 {
    (count as f64).ln_1p() as f32
}

/// Probabilistic IDF, clamped at zero so very common buckets never push scores negative.
pub fn idf(num_docs: u32, doc_freq: u32) -> f32 {
    let n = num_docs as f64;
    let df = doc_freq as f64;
    let idf = ((n - df + 0.5) / (df + 0.5)).ln();
    // df > N makes the ratio negative and ln NaN; both clamp to zero.
    if idf > 0.0 { idf as f32 } else { 0.0 }
}

/// One-row sparse vector: sorted unique buckets with their weights.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    dim: u32,
    indices: Vec<Bucket>,
    weights: Vec<f32>,
}

impl QueryVector {
    /// The all-zero vector of dimension `dim`.
    pub fn zeros(dim: u32) -> Self {
        Self { dim, indices: Vec::new(), weights: Vec::new() }
    }

    /// Weight hashed n-gram occurrences against the corpus statistics.
    pub fn weighted(dim: u32, buckets: &[Bucket], doc_freqs: &[u32], num_docs: u32) -> Self {
        let mut counts: BTreeMap<Bucket, u32> = BTreeMap::new();
        for &b in buckets {
            *counts.entry(b).or_insert(0) += 1;
        }
        let mut indices = Vec::with_capacity(counts.len());
        let mut weights = Vec::with_capacity(counts.len());
        for (bucket, count) in counts {
            let df = doc_freqs.get(bucket as usize).copied().unwrap_or(0);
            indices.push(bucket);
            weights.push(tf(count) * idf(num_docs, df));
        }
        Self { dim, indices, weights }
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    pub fn indices(&self) -> &[Bucket] {
        &self.indices
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of stored entries (some may carry weight zero after IDF clamping).
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, f32)> + '_ {
        self.indices.iter().copied().zip(self.weights.iter().copied())
    }
}

/// Turns raw query text into hashed n-gram bucket ids.
#[derive(Clone)]
pub struct QueryParser {
    tokenizer: Arc<dyn Tokenizer>,
    hasher: Arc<dyn FeatureHasher>,
    ngram: usize,
    hash_size: u32,
}

impl QueryParser {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, hasher: Arc<dyn FeatureHasher>, ngram: usize, hash_size: u32) -> Self {
        Self { tokenizer, hasher, ngram, hash_size }
    }

    /// Normalized, lower-cased, filtered n-grams of the query.
    pub fn parse(&self, query: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(&normalize(query));
        ngrams(&tokens, self.ngram, true, filter_ngram)
    }

    pub fn buckets(&self, query: &str) -> Vec<Bucket> {
        self.parse(query).iter().map(|g| self.hasher.bucket(g, self.hash_size)).collect()
    }
}
