use hashrank::hasher::{FeatureHasher, Murmur3Hasher};
use hashrank::{DocDictionary, IndexParams, MetaBoost, RankerConfig, TermDocMatrix, TfidfIndex, TfidfRanker};
use proptest::prelude::*;

const HASH_SIZE: u32 = 64;
const VOCAB: &[&str] = &["alpha", "beta", "gamma", "delta", "omega", "kappa", "sigma", "zeta"];

/// Random index over VOCAB: each doc holds a subset of the words with positive weights.
fn build_ranker(docs: &[Vec<(usize, f32)>]) -> TfidfRanker {
    let mut triplets = Vec::new();
    let mut doc_freqs = vec![0u32; HASH_SIZE as usize];
    for (d, words) in docs.iter().enumerate() {
        let mut seen = std::collections::HashSet::new();
        for &(w, weight) in words {
            let b = Murmur3Hasher.bucket(VOCAB[w], HASH_SIZE);
            triplets.push((b, d as u32, weight));
            if seen.insert(b) {
                doc_freqs[b as usize] += 1;
            }
        }
    }
    let matrix = TermDocMatrix::from_triplets(HASH_SIZE, docs.len() as u32, &triplets).unwrap();
    let dict = DocDictionary::from_ids((0..docs.len()).map(|i| format!("doc{i}")));
    let index = TfidfIndex::new(IndexParams { ngram: 1, hash_size: HASH_SIZE }, matrix, doc_freqs, dict).unwrap();
    TfidfRanker::new(index, RankerConfig::default())
}

fn corpus() -> impl Strategy<Value = Vec<Vec<(usize, f32)>>> {
    prop::collection::vec(prop::collection::vec((0..VOCAB.len(), 0.1f32..2.0), 0..5), 1..20)
}

fn query() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 1..4).prop_map(|w| w.join(" "))
}

proptest! {
    #[test]
    fn hashing_is_deterministic(token in "\\PC{0,12}", size in 1u32..100_000) {
        let a = Murmur3Hasher.bucket(&token, size);
        prop_assert_eq!(a, Murmur3Hasher.bucket(&token, size));
        prop_assert!(a < size);
    }

    #[test]
    fn closest_docs_is_bounded_sorted_top_k(docs in corpus(), q in query(), k in 0usize..8) {
        let r = build_ranker(&docs);
        let all: Vec<u32> = (0..docs.len() as u32).collect();
        let scores = r.doc_scores(&q, &all, &MetaBoost::none()).unwrap();
        let nonzero = scores.iter().filter(|s| **s != 0.0).count();

        let hits = r.closest_docs(&q, &MetaBoost::none(), k).unwrap();
        prop_assert_eq!(hits.len(), k.min(nonzero));
        prop_assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));
        for &(d, s) in &hits {
            prop_assert!(s != 0.0);
            prop_assert_eq!(s, scores[d as usize]);
        }
        // Nothing left out scores higher than the last hit.
        if let Some(&(_, floor)) = hits.last() {
            let better = scores.iter().filter(|s| **s > floor).count();
            prop_assert!(better < hits.len());
        }
    }

    #[test]
    fn query_weights_never_negative(docs in corpus(), q in query()) {
        let r = build_ranker(&docs);
        let v = r.vectorize(&q, true).unwrap();
        prop_assert!(v.weights().iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn batch_order_independent_of_workers(docs in corpus(), qs in prop::collection::vec(query(), 1..6)) {
        let r = build_ranker(&docs);
        let single: Vec<_> = qs.iter().map(|q| r.closest_docs(q, &MetaBoost::none(), 3).unwrap()).collect();
        for workers in [Some(1), Some(3)] {
            let batch: Vec<_> = r
                .batch_closest_docs(&qs, &MetaBoost::none(), 3, workers)
                .unwrap()
                .into_iter()
                .map(|res| res.unwrap())
                .collect();
            prop_assert_eq!(&batch, &single);
        }
    }
}
