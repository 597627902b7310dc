use anyhow::{Context, Result};
use hashrank::persist::{load_index, load_meta, IndexPaths, MetaFile};
use hashrank::{DocIndex, MetaBoost, RankerConfig, TfidfRanker};
use serde::Serialize;

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// Wall time of the whole batch this query ran in.
    pub batch_took_s: f64,
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_index: DocIndex,
    pub doc_id: String,
    pub score: f32,
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct ScoresResponse {
    pub query: String,
    pub scores: Vec<DocScore>,
}

#[derive(Serialize)]
pub struct DocScore {
    pub doc_id: String,
    pub score: f32,
}

/// Load the bundle in `index_dir` and wrap it in a ranker.
pub fn open_ranker(index_dir: &str, config: RankerConfig) -> Result<TfidfRanker> {
    let index = load_index(&IndexPaths::new(index_dir)).with_context(|| format!("loading index from {index_dir}"))?;
    Ok(TfidfRanker::new(index, config))
}

pub fn index_info(index_dir: &str) -> Result<MetaFile> {
    load_meta(&IndexPaths::new(index_dir))
}

/// Run every query through the batch path; a failed query reports its error in place.
pub fn search(
    ranker: &TfidfRanker,
    queries: &[String],
    boost: &MetaBoost,
    k: usize,
    workers: Option<usize>,
) -> Result<Vec<SearchResponse>> {
    let start = std::time::Instant::now();
    let batch = ranker.batch_closest_docs(queries, boost, k, workers)?;
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(queries = queries.len(), took_s, "search finished");

    let mut out = Vec::with_capacity(queries.len());
    for (query, res) in queries.iter().zip(batch) {
        let resp = match res {
            Ok(hits) => SearchResponse {
                query: query.clone(),
                batch_took_s: took_s,
                results: hits.into_iter().map(|(i, score)| hit(ranker, i, score)).collect::<Result<_>>()?,
                error: None,
            },
            Err(e) => SearchResponse { query: query.clone(), batch_took_s: took_s, results: vec![], error: Some(e.to_string()) },
        };
        out.push(resp);
    }
    Ok(out)
}

fn hit(ranker: &TfidfRanker, doc_index: DocIndex, score: f32) -> Result<SearchHit> {
    let doc_id = ranker.get_doc_id(doc_index)?.to_string();
    let meta = ranker.doc_meta(&doc_id);
    Ok(SearchHit { doc_index, doc_id, score, title: meta.title, url: meta.url })
}

/// Score a fixed shortlist of documents, given by doc id.
pub fn scores(ranker: &TfidfRanker, query: &str, doc_ids: &[String], boost: &MetaBoost) -> Result<ScoresResponse> {
    let indices = doc_ids.iter().map(|id| ranker.get_doc_index(id)).collect::<hashrank::Result<Vec<_>>>()?;
    let values = ranker.doc_scores(query, &indices, boost)?;
    let scores = doc_ids
        .iter()
        .zip(values)
        .map(|(id, score)| DocScore { doc_id: id.clone(), score })
        .collect();
    Ok(ScoresResponse { query: query.to_string(), scores })
}

pub fn doc_meta_json(ranker: &TfidfRanker, doc_ids: &[String], workers: Option<usize>) -> Result<serde_json::Value> {
    let metas = ranker.batch_doc_meta(doc_ids, workers)?;
    let entries: Vec<_> = doc_ids
        .iter()
        .zip(metas)
        .map(|(id, meta)| {
            serde_json::json!({
                "doc_id": id,
                "title": meta.title,
                "url": meta.url,
                "fields": meta.fields,
            })
        })
        .collect();
    Ok(serde_json::Value::Array(entries))
}
