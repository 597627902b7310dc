//! Query-time ranking over a hashed TF-IDF term-document index.
//!
//! A query is tokenized into n-grams, hashed into a fixed feature space,
//! weighted by TF-IDF and scored against the index matrix by sparse dot
//! product. Scores can be fused with per-query boost tables, and batches of
//! queries fan out over worker pools.

pub mod batch;
pub mod config;
pub mod error;
pub mod hasher;
pub mod index;
pub mod persist;
pub mod ranker;
pub mod tokenizer;
pub mod vectorizer;

pub use config::RankerConfig;
pub use error::{RankError, Result};
pub use index::{
    BoostEntry, Bucket, DocDictionary, DocIndex, DocMeta, IndexParams, MetaTable, TermDocMatrix, TfidfIndex,
};
pub use ranker::{MetaBoost, TfidfRanker};
pub use vectorizer::QueryVector;
