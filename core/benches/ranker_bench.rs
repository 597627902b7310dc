use criterion::{criterion_group, criterion_main, Criterion};
use hashrank::hasher::{FeatureHasher, Murmur3Hasher};
use hashrank::{DocDictionary, IndexParams, MetaBoost, RankerConfig, TermDocMatrix, TfidfIndex, TfidfRanker};

const HASH_SIZE: u32 = 1 << 20;
const NUM_DOCS: u32 = 20_000;

fn synthetic_ranker() -> TfidfRanker {
    let words: Vec<String> = (0..5_000).map(|i| format!("term{i}")).collect();
    let mut triplets = Vec::new();
    let mut doc_freqs = vec![0u32; HASH_SIZE as usize];
    for d in 0..NUM_DOCS {
        for j in 0..30u32 {
            let w = &words[((d * 31 + j * 97) % words.len() as u32) as usize];
            let b = Murmur3Hasher.bucket(w, HASH_SIZE);
            triplets.push((b, d, 1.0 / (1 + j) as f32));
            doc_freqs[b as usize] += 1;
        }
    }
    let matrix = TermDocMatrix::from_triplets(HASH_SIZE, NUM_DOCS, &triplets).unwrap();
    let dict = DocDictionary::from_ids((0..NUM_DOCS).map(|d| format!("doc{d}")));
    let index = TfidfIndex::new(IndexParams { ngram: 2, hash_size: HASH_SIZE }, matrix, doc_freqs, dict).unwrap();
    TfidfRanker::new(index, RankerConfig::default())
}

fn bench_ranker(c: &mut Criterion) {
    let ranker = synthetic_ranker();
    let query = "term12 term400 term4999 term7 and the term12";
    c.bench_function("vectorize", |b| b.iter(|| ranker.vectorize(query, true)));
    c.bench_function("closest_docs_k10", |b| b.iter(|| ranker.closest_docs(query, &MetaBoost::none(), 10)));

    let queries: Vec<String> = (0..64).map(|i| format!("term{i} term{}", i * 13)).collect();
    c.bench_function("batch_closest_docs_64", |b| {
        b.iter(|| ranker.batch_closest_docs(&queries, &MetaBoost::none(), 10, Some(4)))
    });
}

criterion_group!(benches, bench_ranker);
criterion_main!(benches);
