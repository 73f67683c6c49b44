//! Integrity verification of the installed binary
//!
//! Compares the MD5 digest of the local binary with the `.md5` sidecar the
//! repository publishes next to every artifact. Any failure along the way
//! counts as "no match".

use crate::error::RegistryError;
use crate::registry::Fetcher;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Read buffer size for hashing
const CHUNK_SIZE: usize = 64 * 1024;

/// Reasons a check could not produce a match; never leaves this module
#[derive(Error, Debug)]
enum IntegrityFailure {
    #[error("failed to hash {path}: {source}")]
    LocalDigest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    RemoteDigest(#[from] RegistryError),

    #[error("remote checksum at {url} is empty")]
    EmptyRemote { url: String },
}

/// Checks whether the local binary already equals a published artifact
#[derive(Clone)]
pub struct IntegrityVerifier {
    fetcher: Arc<dyn Fetcher>,
}

impl IntegrityVerifier {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// True only if both digests are available and equal (case-insensitive)
    pub async fn matches(&self, local_binary: &Path, md5_url: &str) -> bool {
        match self.compare(local_binary, md5_url).await {
            Ok(matched) => {
                debug!(path = %local_binary.display(), md5_url, matched, "integrity check");
                matched
            }
            Err(e) => {
                debug!(error = %e, "integrity check failed, treating as no match");
                false
            }
        }
    }

    async fn compare(&self, local_binary: &Path, md5_url: &str) -> Result<bool, IntegrityFailure> {
        let local = file_md5(local_binary).map_err(|source| IntegrityFailure::LocalDigest {
            path: local_binary.to_path_buf(),
            source,
        })?;

        let body = self.fetcher.fetch_text(md5_url).await?;
        // Sidecars may carry "<digest>  <file name>"
        let remote = body
            .split_whitespace()
            .next()
            .ok_or_else(|| IntegrityFailure::EmptyRemote {
                url: md5_url.to_string(),
            })?;

        Ok(remote.eq_ignore_ascii_case(&local))
    }
}

/// Lower-case hex MD5 digest of a file's full contents
///
/// The file handle is dropped before returning on every path.
pub fn file_md5(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut context = md5::Context::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        context.consume(&buf[..read]);
    }

    Ok(format!("{:x}", context.compute()))
}
