#![allow(dead_code)]

use hashrank::hasher::{FeatureHasher, Murmur3Hasher};
use hashrank::{
    BoostEntry, DocDictionary, DocMeta, IndexParams, MetaTable, RankerConfig, TermDocMatrix, TfidfIndex, TfidfRanker,
};
use std::collections::HashMap;

pub const HASH_SIZE: u32 = 1000;

pub fn bucket(token: &str) -> u32 {
    Murmur3Hasher.bucket(token, HASH_SIZE)
}

/// Two buckets distinct from each other and from `taken`.
fn free_buckets(taken: &[u32]) -> (u32, u32) {
    let mut free = (0..HASH_SIZE).filter(|b| !taken.contains(b));
    let a = free.next().unwrap();
    let b = free.next().unwrap();
    (a, b)
}

/// Three docs; "hello" and "world" occur only in doc 1. Doc 0 and doc 2 hold
/// one feature each that no test query hashes to, so "zebra" matches nothing.
/// Meta source "covidex" boosts doc 2 for the exact query "hello world".
pub fn hello_world_index() -> TfidfIndex {
    let (hello, world) = (bucket("hello"), bucket("world"));
    let (other0, other2) = free_buckets(&[hello, world, bucket("zebra")]);

    let matrix = TermDocMatrix::from_triplets(
        HASH_SIZE,
        3,
        &[(hello, 1, 0.6), (world, 1, 0.4), (other0, 0, 1.0), (other2, 2, 1.0)],
    )
    .unwrap();

    let mut doc_freqs = vec![0u32; HASH_SIZE as usize];
    for b in [hello, world, other0, other2] {
        doc_freqs[b as usize] = 1;
    }

    let mut metadata = HashMap::new();
    metadata.insert(
        "d1".to_string(),
        DocMeta { title: Some("Hello World".into()), url: None, fields: Default::default() },
    );

    let mut covidex = MetaTable::new();
    covidex.insert("hello world".into(), BoostEntry { doc_indices: vec![2], values: vec![0.5] });

    let dict = DocDictionary::from_ids(["d0", "d1", "d2"])
        .with_metadata(metadata)
        .with_meta_source("covidex", covidex);

    TfidfIndex::new(IndexParams { ngram: 1, hash_size: HASH_SIZE }, matrix, doc_freqs, dict).unwrap()
}

pub fn ranker(strict: bool) -> TfidfRanker {
    TfidfRanker::new(hello_world_index(), RankerConfig { strict, workers: None })
}
