use crate::error::{RankError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type Bucket = u32;
pub type DocIndex = u32;

/// Free-form per-document record. The default value is the empty record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: Option<String>,
    pub url: Option<String>,
    pub fields: BTreeMap<String, String>,
}

/// Boost values attached to one raw query string: `values[i]` goes to `doc_indices[i]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoostEntry {
    pub doc_indices: Vec<DocIndex>,
    pub values: Vec<f32>,
}

/// Raw query string -> boost entry, for one meta source.
pub type MetaTable = HashMap<String, BoostEntry>;

/// Bidirectional doc id <-> doc index map plus optional metadata and boost tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocDictionary {
    pub id_to_index: HashMap<String, DocIndex>,
    pub index_to_id: Vec<String>,
    pub metadata: Option<HashMap<String, DocMeta>>,
    pub meta_sources: Option<HashMap<String, MetaTable>>,
}

impl DocDictionary {
    /// Assigns indices in the order the ids are given.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index_to_id: Vec<String> = ids.into_iter().map(Into::into).collect();
        let id_to_index = index_to_id
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i as DocIndex))
            .collect();
        Self { id_to_index, index_to_id, metadata: None, meta_sources: None }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, DocMeta>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_meta_source(mut self, name: impl Into<String>, table: MetaTable) -> Self {
        self.meta_sources.get_or_insert_with(HashMap::new).insert(name.into(), table);
        self
    }

    pub fn num_docs(&self) -> u32 {
        self.index_to_id.len() as u32
    }

    fn validate(&self) -> Result<()> {
        if self.id_to_index.len() != self.index_to_id.len() {
            return Err(RankError::InvalidIndex(format!(
                "doc dictionary has {} ids but {} indices",
                self.id_to_index.len(),
                self.index_to_id.len()
            )));
        }
        for (i, id) in self.index_to_id.iter().enumerate() {
            if self.id_to_index.get(id) != Some(&(i as DocIndex)) {
                return Err(RankError::InvalidIndex(format!("doc id {id:?} does not map back to index {i}")));
            }
        }
        let num_docs = self.num_docs();
        for (source, table) in self.meta_sources.iter().flatten() {
            for (query, entry) in table {
                if entry.doc_indices.len() != entry.values.len() {
                    return Err(RankError::InvalidIndex(format!(
                        "meta source {source:?}, query {query:?}: {} doc indices but {} values",
                        entry.doc_indices.len(),
                        entry.values.len()
                    )));
                }
                if let Some(bad) = entry.doc_indices.iter().find(|&&d| d >= num_docs) {
                    return Err(RankError::InvalidIndex(format!(
                        "meta source {source:?}, query {query:?}: doc index {bad} out of range"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Sparse `rows x cols` matrix in CSR layout; rows are hashed features,
/// columns are documents. Each row lists `(doc index, weight)` sorted by doc index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermDocMatrix {
    rows: u32,
    cols: u32,
    indptr: Vec<usize>,
    indices: Vec<DocIndex>,
    data: Vec<f32>,
}

impl TermDocMatrix {
    /// Build from `(row, col, value)` triplets; duplicates are summed.
    pub fn from_triplets(rows: u32, cols: u32, triplets: &[(Bucket, DocIndex, f32)]) -> Result<Self> {
        let mut sorted = triplets.to_vec();
        if let Some(&(r, c, _)) = sorted.iter().find(|(r, c, _)| *r >= rows || *c >= cols) {
            return Err(RankError::InvalidIndex(format!("entry ({r}, {c}) outside {rows}x{cols} matrix")));
        }
        sorted.sort_by_key(|&(r, c, _)| (r, c));

        let mut indptr = vec![0usize; rows as usize + 1];
        let mut indices = Vec::with_capacity(sorted.len());
        let mut data: Vec<f32> = Vec::with_capacity(sorted.len());
        let mut last: Option<(Bucket, DocIndex)> = None;
        for (r, c, v) in sorted {
            if last == Some((r, c)) {
                if let Some(x) = data.last_mut() {
                    *x += v;
                }
                continue;
            }
            last = Some((r, c));
            indptr[r as usize + 1] += 1;
            indices.push(c);
            data.push(v);
        }
        for i in 0..rows as usize {
            indptr[i + 1] += indptr[i];
        }
        Ok(Self { rows, cols, indptr, indices, data })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Postings of one hashed feature. Out-of-range rows are empty.
    pub fn row(&self, bucket: Bucket) -> impl Iterator<Item = (DocIndex, f32)> + '_ {
        let (start, end) = match self.indptr.get(bucket as usize..bucket as usize + 2) {
            Some(&[s, e]) => (s, e),
            _ => (0, 0),
        };
        self.indices[start..end].iter().copied().zip(self.data[start..end].iter().copied())
    }

    fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(RankError::InvalidIndex(msg));
        if self.indptr.len() != self.rows as usize + 1 {
            return bad(format!("indptr has {} entries for {} rows", self.indptr.len(), self.rows));
        }
        if self.indices.len() != self.data.len() {
            return bad(format!("{} column indices but {} values", self.indices.len(), self.data.len()));
        }
        if self.indptr.first() != Some(&0) || self.indptr.last() != Some(&self.data.len()) {
            return bad("indptr does not span the stored values".into());
        }
        if self.indptr.windows(2).any(|w| w[0] > w[1]) {
            return bad("indptr is not monotone".into());
        }
        if let Some(c) = self.indices.iter().find(|&&c| c >= self.cols) {
            return bad(format!("column index {c} outside {} columns", self.cols));
        }
        Ok(())
    }
}

/// Shape parameters recorded alongside the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParams {
    pub ngram: usize,
    pub hash_size: u32,
}

/// Immutable loaded index: matrix, document frequencies and doc dictionary.
#[derive(Debug, Clone)]
pub struct TfidfIndex {
    params: IndexParams,
    matrix: TermDocMatrix,
    doc_freqs: Vec<u32>,
    doc_dict: DocDictionary,
}

impl TfidfIndex {
    /// Assemble an index, checking that every part agrees on `hash_size` and `num_docs`.
    pub fn new(params: IndexParams, matrix: TermDocMatrix, doc_freqs: Vec<u32>, doc_dict: DocDictionary) -> Result<Self> {
        if params.hash_size == 0 {
            return Err(RankError::InvalidIndex("hash_size must be positive".into()));
        }
        if params.ngram == 0 {
            return Err(RankError::InvalidIndex("ngram must be positive".into()));
        }
        matrix.validate()?;
        doc_dict.validate()?;
        let num_docs = doc_dict.num_docs();
        if matrix.rows() != params.hash_size || matrix.cols() != num_docs {
            return Err(RankError::InvalidIndex(format!(
                "matrix is {}x{}, expected {}x{}",
                matrix.rows(),
                matrix.cols(),
                params.hash_size,
                num_docs
            )));
        }
        if doc_freqs.len() != params.hash_size as usize {
            return Err(RankError::InvalidIndex(format!(
                "doc_freqs has {} entries, expected {}",
                doc_freqs.len(),
                params.hash_size
            )));
        }
        let too_common = doc_freqs.iter().filter(|&&df| df > num_docs).count();
        if too_common > 0 {
            tracing::warn!(too_common, num_docs, "doc frequencies exceed corpus size");
        }
        Ok(Self { params, matrix, doc_freqs, doc_dict })
    }

    pub fn params(&self) -> IndexParams {
        self.params
    }

    pub fn hash_size(&self) -> u32 {
        self.params.hash_size
    }

    pub fn ngram(&self) -> usize {
        self.params.ngram
    }

    pub fn num_docs(&self) -> u32 {
        self.doc_dict.num_docs()
    }

    pub fn matrix(&self) -> &TermDocMatrix {
        &self.matrix
    }

    pub fn doc_freqs(&self) -> &[u32] {
        &self.doc_freqs
    }

    pub fn doc_dict(&self) -> &DocDictionary {
        &self.doc_dict
    }
}
