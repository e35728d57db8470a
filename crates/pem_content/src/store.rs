// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Certificate and private key configuration for consumers such as TLS setup code.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::certificate::Certificate;
use crate::content::PemContent;
use crate::error::{DecodeError, KeyLoadError, ResolutionError};
use crate::pem::is_pem_formatted;
use crate::private_key::PrivateKey;
use crate::resource::{
    file_prefixed_path, is_url, DefaultResourceLoader, ResourceLoader, CLASSPATH_PREFIX,
};

/// Allows a config to have its paths updated to be relative to a given directory.
pub trait RelativeConfig: Sized {
    /// Consume self, returning version of config with its paths updated to be relative to `base`
    fn relative_to(self, _base: impl AsRef<Path>) -> Self {
        self
    }
}

/// Where to find a certificate chain and its private key.
///
/// Each entry is either inline PEM text or a resource locator.
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PemStoreConfig {
    pub certificate: Option<String>,
    pub private_key: Option<String>,
    pub private_key_password: Option<String>,
}

impl PemStoreConfig {
    /// Reads a config from a TOML file. Relative paths in the config are taken relative to the
    /// directory containing the file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let config = std::fs::read_to_string(path).map_err(|source| StoreError::ReadConfig {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = toml::from_str(&config).map_err(|source| StoreError::ParseConfig {
            path: path.to_owned(),
            source,
        })?;
        let parent_path = path.parent().unwrap_or(".".as_ref());
        Ok(config.relative_to(parent_path))
    }

    pub fn load(&self) -> Result<PemStore, StoreError> {
        self.load_with(&DefaultResourceLoader::from_env())
    }

    pub fn load_with(&self, loader: &dyn ResourceLoader) -> Result<PemStore, StoreError> {
        let certificates = match resolve(StoreEntry::Certificate, &self.certificate, loader)? {
            Some(content) => content.certificates().map_err(StoreError::Certificates)?,
            None => Vec::new(),
        };
        let private_key = match resolve(StoreEntry::PrivateKey, &self.private_key, loader)? {
            Some(content) => Some(self.first_private_key(&content)?),
            None => None,
        };
        debug!(
            "loaded PEM store with {} certificate(s) and {} private key",
            certificates.len(),
            if private_key.is_some() { "a" } else { "no" }
        );
        Ok(PemStore {
            certificates,
            private_key,
        })
    }

    fn first_private_key(&self, content: &PemContent) -> Result<PrivateKey, StoreError> {
        let keys = match &self.private_key_password {
            Some(password) => content.private_keys_with_password(password),
            None => content.private_keys(),
        }
        .map_err(StoreError::PrivateKey)?;
        if keys.len() > 1 {
            warn!(
                "private key entry holds {} keys, only the first is used",
                keys.len()
            );
        }
        keys.into_iter().next().ok_or(StoreError::MissingPrivateKey)
    }
}

fn resolve(
    entry: StoreEntry,
    input: &Option<String>,
    loader: &dyn ResourceLoader,
) -> Result<Option<PemContent>, StoreError> {
    PemContent::load_with(input.as_deref(), loader)
        .map_err(|source| StoreError::Resolution { entry, source })
}

impl RelativeConfig for PemStoreConfig {
    fn relative_to(self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            certificate: self.certificate.map(|c| rebase_locator(c, base)),
            private_key: self.private_key.map(|k| rebase_locator(k, base)),
            private_key_password: self.private_key_password,
        }
    }
}

/// Joins relative file paths (bare or `file:` prefixed) onto `base`, leaving inline PEM, URLs and
/// class path references alone.
fn rebase_locator(value: String, base: &Path) -> String {
    if is_pem_formatted(&value) || value.starts_with(CLASSPATH_PREFIX) {
        return value;
    }
    if let Some(path) = file_prefixed_path(&value) {
        if Path::new(path).is_absolute() {
            return value;
        }
        return base.join(path).to_string_lossy().into_owned();
    }
    if is_url(&value) || Path::new(&value).is_absolute() {
        return value;
    }
    base.join(&value).to_string_lossy().into_owned()
}

impl fmt::Debug for PemStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PemStoreConfig")
            .field("certificate", &self.certificate)
            .field("private_key", &self.private_key.as_ref().map(|_| "omitted"))
            .field(
                "private_key_password",
                &self.private_key_password.as_ref().map(|_| "omitted"),
            )
            .finish()
    }
}

/// Certificates and private key loaded from a [`PemStoreConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PemStore {
    certificates: Vec<Certificate>,
    private_key: Option<PrivateKey>,
}

impl PemStore {
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty() && self.private_key.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEntry {
    Certificate,
    PrivateKey,
}

impl fmt::Display for StoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Certificate => write!(f, "certificate"),
            Self::PrivateKey => write!(f, "private key"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Couldn't open config TOML {path:?}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't parse config TOML {path:?}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unable to resolve {entry}: {source}")]
    Resolution {
        entry: StoreEntry,
        #[source]
        source: ResolutionError,
    },
    #[error("Unable to load certificates: {0}")]
    Certificates(#[source] DecodeError),
    #[error("Unable to load private key: {0}")]
    PrivateKey(#[source] KeyLoadError),
    #[error("Missing private key or unrecognized format")]
    MissingPrivateKey,
}
