use crate::batch::WorkerPools;
use crate::config::RankerConfig;
use crate::error::{RankError, Result};
use crate::hasher::{FeatureHasher, Murmur3Hasher};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};
use crate::vectorizer::{QueryParser, QueryVector};
use crate::{DocIndex, DocMeta, TfidfIndex};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Span;

/// Which meta sources to fuse into lexical scores, and how strongly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaBoost {
    pub sources: Vec<String>,
    pub scale: f32,
}

impl MetaBoost {
    pub fn new<I, S>(sources: I, scale: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { sources: sources.into_iter().map(Into::into).collect(), scale }
    }

    /// No boosting; scores are purely lexical.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Scores queries against a loaded [`TfidfIndex`] by sparse dot product.
pub struct TfidfRanker {
    index: TfidfIndex,
    parser: QueryParser,
    config: RankerConfig,
    pools: WorkerPools,
    span: Span,
}

impl TfidfRanker {
    pub fn new(index: TfidfIndex, config: RankerConfig) -> Self {
        Self::with_components(index, config, Arc::new(SimpleTokenizer), Arc::new(Murmur3Hasher))
    }

    /// Use a custom tokenizer and hasher; both must match the ones the index was built with.
    pub fn with_components(
        index: TfidfIndex,
        config: RankerConfig,
        tokenizer: Arc<dyn Tokenizer>,
        hasher: Arc<dyn FeatureHasher>,
    ) -> Self {
        let parser = QueryParser::new(tokenizer, hasher, index.ngram(), index.hash_size());
        let span = tracing::info_span!(
            "hashrank::ranker",
            hash_size = index.hash_size(),
            num_docs = index.num_docs(),
            strict = config.strict
        );
        Self { index, parser, config, pools: WorkerPools::new(config.workers), span }
    }

    pub fn index(&self) -> &TfidfIndex {
        &self.index
    }

    pub fn config(&self) -> RankerConfig {
        self.config
    }

    pub fn get_doc_index(&self, doc_id: &str) -> Result<DocIndex> {
        self.index
            .doc_dict()
            .id_to_index
            .get(doc_id)
            .copied()
            .ok_or_else(|| RankError::UnknownDocId(doc_id.to_string()))
    }

    pub fn get_doc_id(&self, doc_index: DocIndex) -> Result<&str> {
        self.index
            .doc_dict()
            .index_to_id
            .get(doc_index as usize)
            .map(String::as_str)
            .ok_or(RankError::DocIndexOutOfRange { index: doc_index, num_docs: self.index.num_docs() })
    }

    /// Metadata record for `doc_id`; the empty record when unknown or when no metadata was loaded.
    pub fn doc_meta(&self, doc_id: &str) -> DocMeta {
        self.index
            .doc_dict()
            .metadata
            .as_ref()
            .and_then(|m| m.get(doc_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn parse(&self, query: &str) -> Vec<String> {
        self.parser.parse(query)
    }

    /// Build the TF-IDF query vector. With no valid n-gram, strict mode fails
    /// with [`RankError::EmptyQuery`]; otherwise the zero vector is returned.
    pub fn vectorize(&self, query: &str, strict: bool) -> Result<QueryVector> {
        let buckets = self.parser.buckets(query);
        if buckets.is_empty() {
            if strict {
                return Err(RankError::EmptyQuery { query: query.to_string() });
            }
            tracing::warn!(parent: &self.span, query, "no valid word in query");
            return Ok(QueryVector::zeros(self.index.hash_size()));
        }
        Ok(QueryVector::weighted(
            self.index.hash_size(),
            &buckets,
            self.index.doc_freqs(),
            self.index.num_docs(),
        ))
    }

    /// Query vector times matrix, plus meta boosts. Only touched documents are present.
    fn score_row(&self, query: &str, boost: &MetaBoost) -> Result<HashMap<DocIndex, f32>> {
        let spvec = self.vectorize(query, self.config.strict)?;
        let matrix = self.index.matrix();
        let mut scores: HashMap<DocIndex, f32> = HashMap::new();
        for (bucket, q_w) in spvec.iter() {
            if q_w == 0.0 {
                continue;
            }
            for (doc, d_w) in matrix.row(bucket) {
                *scores.entry(doc).or_insert(0.0) += q_w * d_w;
            }
        }
        for (doc, delta) in self.boost_delta(query, boost) {
            *scores.entry(doc).or_insert(0.0) += delta;
        }
        Ok(scores)
    }

    /// Boosts keyed on the exact raw query string, already multiplied by `boost.scale`.
    fn boost_delta(&self, query: &str, boost: &MetaBoost) -> Vec<(DocIndex, f32)> {
        let Some(tables) = self.index.doc_dict().meta_sources.as_ref() else {
            return Vec::new();
        };
        let mut delta = Vec::new();
        for source in &boost.sources {
            let Some(table) = tables.get(source) else {
                tracing::debug!(parent: &self.span, source = %source, "meta source not loaded");
                continue;
            };
            if let Some(entry) = table.get(query) {
                delta.extend(
                    entry
                        .doc_indices
                        .iter()
                        .zip(&entry.values)
                        .map(|(&doc, &v)| (doc, v * boost.scale)),
                );
            }
        }
        delta
    }

    /// Top `k` documents by score, descending; equal scores order by ascending doc index.
    /// Documents scoring exactly zero are never returned.
    pub fn closest_docs(&self, query: &str, boost: &MetaBoost, k: usize) -> Result<Vec<(DocIndex, f32)>> {
        let scores = self.score_row(query, boost)?;
        let candidates: Vec<(DocIndex, f32)> = scores.into_iter().filter(|&(_, s)| s != 0.0).collect();
        Ok(top_k(candidates, k))
    }

    /// Scores at exactly the requested positions, in the requested order.
    pub fn doc_scores(&self, query: &str, doc_indices: &[DocIndex], boost: &MetaBoost) -> Result<Vec<f32>> {
        let num_docs = self.index.num_docs();
        if let Some(&index) = doc_indices.iter().find(|&&d| d >= num_docs) {
            return Err(RankError::DocIndexOutOfRange { index, num_docs });
        }
        let scores = self.score_row(query, boost)?;
        Ok(doc_indices.iter().map(|d| scores.get(d).copied().unwrap_or(0.0)).collect())
    }

    /// Worker count a batch call runs with; `None` or `Some(0)` use [`RankerConfig::workers`],
    /// and `None` here means the global rayon pool.
    pub fn worker_count(&self, workers: Option<usize>) -> Option<usize> {
        self.pools.resolve(workers)
    }

    pub fn batch_doc_meta(&self, doc_ids: &[String], workers: Option<usize>) -> Result<Vec<DocMeta>> {
        self.pools.map(doc_ids, workers, |id| self.doc_meta(id))
    }

    /// [`closest_docs`](Self::closest_docs) per query; a failing query only fails its own slot.
    pub fn batch_closest_docs(
        &self,
        queries: &[String],
        boost: &MetaBoost,
        k: usize,
        workers: Option<usize>,
    ) -> Result<Vec<Result<Vec<(DocIndex, f32)>>>> {
        let _enter = self.span.enter();
        tracing::debug!(queries = queries.len(), k, "batch closest_docs");
        self.pools.map(queries, workers, |q| self.closest_docs(q, boost, k))
    }

    pub fn batch_doc_scores(
        &self,
        queries: &[String],
        doc_indices: &[Vec<DocIndex>],
        boost: &MetaBoost,
        workers: Option<usize>,
    ) -> Result<Vec<Result<Vec<f32>>>> {
        if queries.len() != doc_indices.len() {
            return Err(RankError::BatchLengthMismatch { queries: queries.len(), doc_lists: doc_indices.len() });
        }
        let _enter = self.span.enter();
        tracing::debug!(queries = queries.len(), "batch doc_scores");
        let items: Vec<(&String, &Vec<DocIndex>)> = queries.iter().zip(doc_indices).collect();
        self.pools.map(&items, workers, |(q, idxs)| self.doc_scores(q, idxs, boost))
    }
}

fn by_score_desc(a: &(DocIndex, f32), b: &(DocIndex, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Partial selection of the `k` best, then a sort of just those.
fn top_k(mut candidates: Vec<(DocIndex, f32)>, k: usize) -> Vec<(DocIndex, f32)> {
    if k == 0 {
        return Vec::new();
    }
    if candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, by_score_desc);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(by_score_desc);
    candidates
}
