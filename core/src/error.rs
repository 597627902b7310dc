use crate::DocIndex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    /// Query produced no hashed features and the ranker is strict.
    #[error("no valid word in query: {query:?}")]
    EmptyQuery { query: String },

    #[error("doc index {index} out of range (num_docs = {num_docs})")]
    DocIndexOutOfRange { index: DocIndex, num_docs: u32 },

    #[error("unknown doc id: {0}")]
    UnknownDocId(String),

    #[error("invalid index: {0}")]
    InvalidIndex(String),

    #[error("batch length mismatch: {queries} queries, {doc_lists} doc index lists")]
    BatchLengthMismatch { queries: usize, doc_lists: usize },

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, RankError>;
