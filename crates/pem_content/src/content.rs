// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::io::Read;

use tracing::debug;

use crate::certificate::{parse_certificates, Certificate};
use crate::error::{DecodeError, KeyLoadError, ResolutionError, ResourceError};
use crate::pem::is_pem_formatted;
use crate::private_key::{parse_private_keys, parse_private_keys_with_password, PrivateKey};
use crate::resource::{DefaultResourceLoader, ResourceLoader};

/// PEM encoded text, either given inline or read from a resource.
///
/// The text is not guaranteed to be well-formed PEM; problems surface when certificates or keys
/// are extracted. Equality and hashing only consider the text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PemContent {
    text: String,
}

impl PemContent {
    /// Resolves `input` using a [`DefaultResourceLoader`] configured from the environment.
    ///
    /// `None` means no source is configured and gives `Ok(None)`. Input that already looks like
    /// PEM is used as-is; anything else is treated as a resource locator (path, `file:` URL or
    /// `classpath:` reference) whose full contents must be UTF-8 text.
    pub fn load(input: Option<&str>) -> Result<Option<Self>, ResolutionError> {
        Self::load_with(input, &DefaultResourceLoader::from_env())
    }

    /// Like [`PemContent::load`], but opens resources through `loader`.
    pub fn load_with(
        input: Option<&str>,
        loader: &dyn ResourceLoader,
    ) -> Result<Option<Self>, ResolutionError> {
        let Some(input) = input else {
            return Ok(None);
        };
        if is_pem_formatted(input) {
            debug!("using inline PEM content");
            return Ok(Some(Self {
                text: input.to_owned(),
            }));
        }
        debug!("reading PEM content from {input}");
        let text = read_resource(loader, input).map_err(|err| ResolutionError::new(input, err))?;
        Ok(Some(Self { text }))
    }

    /// The resolved text, exactly as given inline or read from the resource.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Certificates in the content, in the order they appear.
    pub fn certificates(&self) -> Result<Vec<Certificate>, DecodeError> {
        parse_certificates(&self.text)
    }

    /// Unencrypted private keys in the content, in the order they appear.
    pub fn private_keys(&self) -> Result<Vec<PrivateKey>, KeyLoadError> {
        parse_private_keys(&self.text)
    }

    /// Private keys in the content, decrypting encrypted ones with `password`.
    pub fn private_keys_with_password(
        &self,
        password: impl AsRef<[u8]>,
    ) -> Result<Vec<PrivateKey>, KeyLoadError> {
        parse_private_keys_with_password(&self.text, password)
    }
}

// The reader is dropped, closing the underlying resource, before this returns.
fn read_resource(loader: &dyn ResourceLoader, locator: &str) -> Result<String, ResourceError> {
    let mut reader = loader.open(locator)?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(ResourceError::Read)?;
    String::from_utf8(bytes).map_err(|_| ResourceError::InvalidUtf8)
}

impl fmt::Display for PemContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for PemContent {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<PemContent> for String {
    fn from(value: PemContent) -> Self {
        value.text
    }
}
