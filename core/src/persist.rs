use crate::{DocDictionary, IndexParams, TermDocMatrix, TfidfIndex};
use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub ngram: usize,
    pub hash_size: u32,
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn matrix(&self) -> PathBuf { self.root.join("matrix.bin") }
    fn doc_freqs(&self) -> PathBuf { self.root.join("doc_freqs.bin") }
    fn doc_dict(&self) -> PathBuf { self.root.join("doc_dict.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn save_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn load_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let value = bincode::deserialize(&buf).with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root).with_context(|| format!("creating {}", paths.root.display()))?;
    let mut f = File::create(paths.meta()).with_context(|| format!("creating {}", paths.meta().display()))?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write every part of the index bundle into `paths.root`.
pub fn save_index(paths: &IndexPaths, index: &TfidfIndex, created_at: &str) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_bin(&paths.matrix(), index.matrix())?;
    save_bin(&paths.doc_freqs(), &index.doc_freqs())?;
    save_bin(&paths.doc_dict(), index.doc_dict())?;
    let params = index.params();
    let meta = MetaFile {
        ngram: params.ngram,
        hash_size: params.hash_size,
        num_docs: index.num_docs(),
        created_at: created_at.to_string(),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)
}

/// Load and validate a bundle written by [`save_index`] (or an external pipeline using the same layout).
pub fn load_index(paths: &IndexPaths) -> Result<TfidfIndex> {
    tracing::info!(root = %paths.root.display(), "loading index");
    let meta = load_meta(paths)?;
    if meta.version != FORMAT_VERSION {
        bail!("unsupported index version {} (expected {FORMAT_VERSION})", meta.version);
    }
    let matrix: TermDocMatrix = load_bin(&paths.matrix())?;
    let doc_freqs: Vec<u32> = load_bin(&paths.doc_freqs())?;
    let doc_dict: DocDictionary = load_bin(&paths.doc_dict())?;
    if doc_dict.num_docs() != meta.num_docs {
        bail!("meta.json says {} docs but doc dictionary has {}", meta.num_docs, doc_dict.num_docs());
    }
    let params = IndexParams { ngram: meta.ngram, hash_size: meta.hash_size };
    let index = TfidfIndex::new(params, matrix, doc_freqs, doc_dict)?;
    tracing::info!(
        hash_size = index.hash_size(),
        num_docs = index.num_docs(),
        nnz = index.matrix().nnz(),
        "index loaded"
    );
    Ok(index)
}
