//! Integrity pinning for evaluator code artifacts
//!
//! Every task pins a content hash of its evaluator artifact at registration
//! time. Before a run, the artifact's current bytes are hashed verbatim (no
//! normalization) and compared against the pin. A mismatch aborts the run;
//! it is a security fault, not a warning.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::path::Path;
use std::str::FromStr;

use crate::error::{BenchError, BenchResult};

/// Digest algorithms accepted in a pinned hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// The prefix used in the `<algorithm>:<hex>` encoding
    pub fn prefix(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Hex digest length for this algorithm
    fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
        }
    }

    /// Hash raw bytes to a lowercase hex digest
    pub fn digest_hex(&self, content: &[u8]) -> String {
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(content);
                format!("{:x}", hasher.finalize())
            }
            HashAlgorithm::Sha512 => {
                let mut hasher = Sha512::new();
                hasher.update(content);
                format!("{:x}", hasher.finalize())
            }
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(BenchError::Configuration(format!(
                "unsupported hash algorithm '{}'",
                other
            ))),
        }
    }
}

/// A content hash pinned at evaluator registration time
///
/// Encoded on the wire as `"<algorithm>:<hex digest>"`. Parsing happens
/// while the task record is deserialized, so a malformed pin is a
/// configuration fault at catalog load time, not at verification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinnedHash {
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest
    pub digest: String,
}

impl PinnedHash {
    /// Pin the given content, typically at task registration time
    pub fn of(algorithm: HashAlgorithm, content: &[u8]) -> Self {
        Self {
            digest: algorithm.digest_hex(content),
            algorithm,
        }
    }
}

impl FromStr for PinnedHash {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, digest) = s.split_once(':').ok_or_else(|| {
            BenchError::Configuration(format!(
                "malformed verification hash '{}': expected '<algorithm>:<hex digest>'",
                s
            ))
        })?;

        let algorithm: HashAlgorithm = prefix.parse()?;

        if digest.len() != algorithm.digest_len()
            || !digest.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(BenchError::Configuration(format!(
                "malformed {} digest in verification hash '{}'",
                prefix, s
            )));
        }

        Ok(Self {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        })
    }
}

impl std::fmt::Display for PinnedHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm.prefix(), self.digest)
    }
}

impl TryFrom<String> for PinnedHash {
    type Error = BenchError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PinnedHash> for String {
    fn from(hash: PinnedHash) -> Self {
        hash.to_string()
    }
}

/// Verify that the artifact at `path` still matches its pinned hash
///
/// Must run before any code belonging to the artifact is loaded or
/// executed. Missing artifact and digest mismatch are distinct faults:
/// the former points at a deployment problem, the latter at tampering.
pub async fn verify_artifact(path: &Path, expected: &PinnedHash) -> BenchResult<()> {
    if !path.is_file() {
        return Err(BenchError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = tokio::fs::read(path).await?;
    let actual = expected.algorithm.digest_hex(&content);

    if actual != expected.digest {
        return Err(BenchError::Integrity {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual: format!("{}:{}", expected.algorithm.prefix(), actual),
        });
    }

    tracing::debug!(path = %path.display(), "integrity check passed");
    Ok(())
}
