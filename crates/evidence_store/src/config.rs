use std::path::PathBuf;

use custody_core::FingerprintPolicy;

/// Path of the JSON data file holding every evidence record.
pub const DATA_FILE_ENV: &str = "CUSTODY_DATA_FILE";
/// When truthy, registered fingerprints must be 64 lower-case hex characters.
pub const STRICT_FINGERPRINTS_ENV: &str = "CUSTODY_STRICT_FINGERPRINTS";

pub const DEFAULT_DATA_FILE: &str = "./data.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_file: PathBuf,
    pub fingerprint_policy: FingerprintPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            fingerprint_policy: FingerprintPolicy::Lenient,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = lookup(DATA_FILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let fingerprint_policy = if lookup(STRICT_FINGERPRINTS_ENV).as_deref().is_some_and(truthy) {
            FingerprintPolicy::Sha256Hex
        } else {
            FingerprintPolicy::Lenient
        };

        Self {
            data_file,
            fingerprint_policy,
        }
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    pub fn with_fingerprint_policy(mut self, policy: FingerprintPolicy) -> Self {
        self.fingerprint_policy = policy;
        self
    }
}

fn truthy(v: &str) -> bool {
    let v = v.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}
