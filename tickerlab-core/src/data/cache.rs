//! Cache file for the raw ticker response.
//!
//! Layout: the body is stored verbatim at the configured path, with a
//! metadata sidecar next to it at `{path}.meta.json`.
//!
//! - Chunked writes (fixed-size reads from the response stream)
//! - Atomic replace (write to `{path}.tmp`, rename into place)
//! - Sidecar records source URL, fetch time, size, and a blake3 hash

use super::provider::MarketError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bytes requested from the response stream per read.
pub const CHUNK_SIZE: usize = 81_920;

/// Metadata sidecar for a downloaded cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub url: String,
    pub fetched_at: chrono::NaiveDateTime,
    pub byte_len: u64,
    pub data_hash: String,
}

impl CacheMeta {
    /// Sidecar path for a cache file: `{path}.meta.json`.
    pub fn path_for(cache_file: &Path) -> PathBuf {
        with_suffix(cache_file, ".meta.json")
    }

    /// Read the sidecar for a cache file, if one exists and parses.
    pub fn read(cache_file: &Path) -> Option<Self> {
        let content = fs::read_to_string(Self::path_for(cache_file)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write(&self, cache_file: &Path) -> Result<(), MarketError> {
        let path = Self::path_for(cache_file);
        let json = serde_json::to_vec_pretty(self).map_err(|e| MarketError::io(&path, e.into()))?;
        fs::write(&path, json).map_err(|e| MarketError::io(path, e))
    }

    /// Re-hash the cache file and compare against the recorded hash.
    pub fn verify(&self, cache_file: &Path) -> Result<bool, MarketError> {
        let bytes = fs::read(cache_file).map_err(|e| MarketError::io(cache_file, e))?;
        Ok(bytes.len() as u64 == self.byte_len
            && blake3::hash(&bytes).to_hex().as_str() == self.data_hash)
    }
}

/// Stream `body` into `cache_file` in [`CHUNK_SIZE`] reads and write the sidecar.
///
/// Read failures on the body are network errors; anything that goes wrong on
/// the local filesystem is an I/O error on the offending path. The target file
/// is only replaced once the whole body has been written. Failing to write the
/// sidecar is logged and otherwise ignored.
pub fn write_cache(
    body: &mut dyn Read,
    cache_file: &Path,
    url: &str,
) -> Result<CacheMeta, MarketError> {
    let tmp_path = with_suffix(cache_file, ".tmp");

    let streamed = stream_to_file(body, &tmp_path);
    let (byte_len, data_hash) = match streamed {
        Ok(v) => v,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    fs::rename(&tmp_path, cache_file).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        MarketError::io(cache_file, e)
    })?;

    let meta = CacheMeta {
        url: url.to_string(),
        fetched_at: chrono::Local::now().naive_local(),
        byte_len,
        data_hash,
    };
    // The body is already in place; a missing sidecar only disables verification.
    if let Err(e) = meta.write(cache_file) {
        warn!(error = %e, "failed to write cache metadata");
    }

    Ok(meta)
}

fn stream_to_file(body: &mut dyn Read, path: &Path) -> Result<(u64, String), MarketError> {
    let file = fs::File::create(path).map_err(|e| MarketError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(MarketError::Network(format!("reading response body: {e}"))),
        };
        out.write_all(&buffer[..n])
            .map_err(|e| MarketError::io(path, e))?;
        hasher.update(&buffer[..n]);
        total += n as u64;
        debug!(bytes = total, "cached chunk");
    }

    let file = out
        .into_inner()
        .map_err(|e| MarketError::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| MarketError::io(path, e))?;

    Ok((total, hasher.finalize().to_hex().to_string()))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
