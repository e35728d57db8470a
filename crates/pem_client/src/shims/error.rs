// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use pem_content::store::StoreError;
use pem_content::{DecodeError, KeyLoadError, ResolutionError};

use crate::inspect::FormatError;
use crate::passphrase::PassphraseError;

#[derive(Debug, thiserror::Error)]
pub enum PemCliError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("Could not read the certificates provided: {0}")]
    CertificateDecode(#[from] DecodeError),
    #[error("Could not use private key provided. Unexpected file contents: {0}")]
    KeyDecode(DecodeError),
    #[error("Could not use private key provided. Perhaps you entered the wrong passphrase")]
    KeyDecrypt,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Passphrase(#[from] PassphraseError),
    #[error("Unable to display the contents in the format requested.")]
    FormatError,
}

impl From<KeyLoadError> for PemCliError {
    fn from(value: KeyLoadError) -> Self {
        match value {
            KeyLoadError::Decode(error) => Self::KeyDecode(error),
            KeyLoadError::Decrypt(_) => Self::KeyDecrypt,
        }
    }
}

impl From<FormatError> for PemCliError {
    fn from(_: FormatError) -> Self {
        Self::FormatError
    }
}
