//! Chunk byte storage
//!
//! A storage node keeps raw chunk bytes keyed by `(file_id, chunk_id)`.
//! Backends: in-memory (default) and one-file-per-chunk on disk.

use crate::common::{encode_key, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Trait for chunk storage backends
pub trait ChunkStore: Send + Sync {
    /// Store `data` verbatim, replacing any earlier copy
    fn put(&self, file_id: &str, chunk_id: u32, data: &[u8]) -> Result<()>;
    /// `None` when the chunk was never stored here
    fn get(&self, file_id: &str, chunk_id: u32) -> Result<Option<Bytes>>;
    fn chunk_count(&self) -> Result<usize>;
}

/// In-memory store (default)
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<HashMap<(String, u32), Bytes>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, u32), Bytes>>> {
        self.chunks
            .lock()
            .map_err(|_| crate::Error::Internal("chunk map lock poisoned".into()))
    }
}

impl ChunkStore for MemoryChunkStore {
    fn put(&self, file_id: &str, chunk_id: u32, data: &[u8]) -> Result<()> {
        self.lock()?
            .insert((file_id.to_string(), chunk_id), Bytes::copy_from_slice(data));
        Ok(())
    }

    fn get(&self, file_id: &str, chunk_id: u32) -> Result<Option<Bytes>> {
        Ok(self.lock()?.get(&(file_id.to_string(), chunk_id)).cloned())
    }

    fn chunk_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

const CHUNK_EXT: &str = "chunk";

/// Longest encoded file id used verbatim in a file name
const MAX_NAME_STEM: usize = 200;

/// On-disk store: `<dir>/<encoded file id>_<chunk id>.chunk`
///
/// Ids whose encoding exceeds `MAX_NAME_STEM` bytes are stored under
/// `%h<blake3 of id>` instead. `%h` cannot occur in an encoded id, since
/// every `%` there starts a hex escape.
pub struct DiskChunkStore {
    dir: PathBuf,
    tmp_seq: AtomicU64,
}

impl DiskChunkStore {
    /// Open or create the chunk directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            tmp_seq: AtomicU64::new(0),
        })
    }

    fn name_stem(file_id: &str, chunk_id: u32) -> String {
        let encoded = encode_key(file_id);
        if encoded.len() <= MAX_NAME_STEM {
            format!("{}_{}", encoded, chunk_id)
        } else {
            format!("%h{}_{}", blake3::hash(file_id.as_bytes()), chunk_id)
        }
    }

    fn chunk_path(&self, file_id: &str, chunk_id: u32) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::name_stem(file_id, chunk_id), CHUNK_EXT))
    }

    /// Unique per write so concurrent puts of one chunk never share a temp file
    fn tmp_path(&self, file_id: &str, chunk_id: u32) -> PathBuf {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{}.{}.tmp", Self::name_stem(file_id, chunk_id), seq))
    }
}

impl ChunkStore for DiskChunkStore {
    fn put(&self, file_id: &str, chunk_id: u32, data: &[u8]) -> Result<()> {
        let path = self.chunk_path(file_id, chunk_id);
        let tmp = self.tmp_path(file_id, chunk_id);
        if let Err(e) = fs::write(&tmp, data).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn get(&self, file_id: &str, chunk_id: u32) -> Result<Option<Bytes>> {
        match fs::read(self.chunk_path(file_id, chunk_id)) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn chunk_count(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CHUNK_EXT) {
                count += 1;
            }
        }
        Ok(count)
    }
}
