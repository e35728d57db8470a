// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;
use std::path::PathBuf;

use pem::PemError;
use thiserror::Error;

/// Failure to turn an input string into [`crate::PemContent`].
///
/// Carries the original input so that an operator can find the misconfigured source.
#[derive(Error, Debug)]
#[error("Error reading certificate or key from '{input}': {source}")]
pub struct ResolutionError {
    pub input: String,
    #[source]
    pub source: ResourceError,
}

impl ResolutionError {
    pub fn new(input: impl Into<String>, source: ResourceError) -> Self {
        Self {
            input: input.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.source,
            ResourceError::NotFound(_) | ResourceError::ClasspathResourceNotFound(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("{0:?} does not exist")]
    NotFound(PathBuf),
    #[error("unable to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("class path resource [{0}] cannot be found in any resource root")]
    ClasspathResourceNotFound(String),
    #[error("could not read resource: {0}")]
    Read(#[source] io::Error),
    #[error("resource is not valid UTF-8 text")]
    InvalidUtf8,
    #[cfg(feature = "remote")]
    #[error("could not fetch resource: {0}")]
    Http(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error(transparent)]
    Pem(#[from] PemError),
    #[error("could not ASN decode: {0}")]
    AsnDecode(String),
    #[error("a password is required for an encrypted private key")]
    PasswordRequired,
    #[error("unsupported private key encryption: {0}")]
    UnsupportedEncryption(String),
    #[error("EC private key does not name its curve")]
    MissingEcParameters,
}

impl From<der::Error> for DecodeError {
    fn from(value: der::Error) -> Self {
        Self::AsnDecode(value.to_string())
    }
}

impl From<pkcs8::Error> for DecodeError {
    fn from(value: pkcs8::Error) -> Self {
        Self::AsnDecode(value.to_string())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unable to decrypt key, perhaps the password is wrong")]
pub struct DecryptionError;

#[derive(Error, Debug, PartialEq)]
pub enum KeyLoadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Decrypt(#[from] DecryptionError),
}
