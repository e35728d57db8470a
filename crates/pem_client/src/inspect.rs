// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use pem_content::store::PemStore;
use pem_content::{Certificate, PrivateKey};

pub const NO_CERTIFICATES_TEXT: &str = "No certificates found";

pub const NO_PRIVATE_KEYS_TEXT: &str = "No private keys found";

const INDENT: usize = 2;
const INDENT2: usize = 2 * INDENT;

/// Trait for types that can be formatted for display in plaintext or json digest form.
pub trait Formattable: Sized {
    type Digest: Serialize + Display + From<Self>;

    fn into_digest(self) -> Self::Digest {
        self.into()
    }

    fn format(self, method: &FormatMethod) -> Result<String, FormatError> {
        match method {
            FormatMethod::PlainDigest => {
                let s = self.into_digest().to_string();
                Ok(s)
            }
            FormatMethod::JsonDigest => {
                let digest = self.into_digest();
                let json = serde_json::to_string_pretty(&digest).map_err(|_| FormatError)?;
                Ok(json)
            }
        }
    }
}

/// Plain digests are separated by a blank line; json digests are collected into an array.
pub fn format_multiple_items<T: Formattable>(
    items: impl IntoIterator<Item = T>,
    method: &FormatMethod,
) -> Result<String, FormatError> {
    let digests: Vec<T::Digest> = items.into_iter().map(T::into_digest).collect();
    match method {
        FormatMethod::PlainDigest => Ok(digests
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        FormatMethod::JsonDigest => {
            serde_json::to_string_pretty(&digests).map_err(|_| FormatError)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatMethod {
    /// Display as a plaintext digest
    PlainDigest,
    /// Display as a json digest
    JsonDigest,
}

#[derive(Error, Debug, PartialEq)]
#[error("unable to format output")]
pub struct FormatError;

#[derive(Error, Debug)]
#[error("could not parse display type, expected one of (plain-digest, json-digest)")]
pub struct FormatMethodParseError;

impl FromStr for FormatMethod {
    type Err = FormatMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain-digest" => Ok(FormatMethod::PlainDigest),
            "json-digest" => Ok(FormatMethod::JsonDigest),
            _ => Err(FormatMethodParseError),
        }
    }
}

/// Contains fields useful for inspecting a certificate
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CertificateDigest {
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub not_before: String,
    pub not_after: String,
}

impl From<Certificate> for CertificateDigest {
    fn from(value: Certificate) -> Self {
        Self {
            subject: value.subject(),
            issuer: value.issuer(),
            serial_number: value.serial_number(),
            not_before: value.not_before(),
            not_after: value.not_after(),
        }
    }
}

impl Formattable for Certificate {
    type Digest = CertificateDigest;
}

impl Display for CertificateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Certificate")?;
        writeln!(f, "{:INDENT$}Subject:", "")?;
        writeln!(f, "{:INDENT2$}{}", "", self.subject)?;
        writeln!(f, "{:INDENT$}Issuer:", "")?;
        writeln!(f, "{:INDENT2$}{}", "", self.issuer)?;
        writeln!(f, "{:INDENT$}Serial number:", "")?;
        writeln!(f, "{:INDENT2$}{}", "", self.serial_number)?;
        writeln!(f, "{:INDENT$}Valid from:", "")?;
        writeln!(f, "{:INDENT2$}{}", "", self.not_before)?;
        writeln!(f, "{:INDENT$}Valid until:", "")?;
        writeln!(f, "{:INDENT2$}{}", "", self.not_after)
    }
}

/// Key material is never part of the digest.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct KeyDigest {
    pub algorithm: String,
    pub algorithm_oid: String,
}

impl From<PrivateKey> for KeyDigest {
    fn from(value: PrivateKey) -> Self {
        Self {
            algorithm: value.algorithm().to_string(),
            algorithm_oid: value.algorithm_oid().to_string(),
        }
    }
}

impl Formattable for PrivateKey {
    type Digest = KeyDigest;
}

impl Display for KeyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Private key")?;
        writeln!(f, "{:INDENT$}Algorithm:", "")?;
        writeln!(f, "{:INDENT2$}{} ({})", "", self.algorithm, self.algorithm_oid)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct StoreDigest {
    pub certificates: Vec<CertificateDigest>,
    pub private_key: Option<KeyDigest>,
}

impl From<PemStore> for StoreDigest {
    fn from(value: PemStore) -> Self {
        Self {
            certificates: value
                .certificates()
                .iter()
                .cloned()
                .map(CertificateDigest::from)
                .collect(),
            private_key: value.private_key().cloned().map(KeyDigest::from),
        }
    }
}

impl Formattable for PemStore {
    type Digest = StoreDigest;
}

impl Display for StoreDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PEM store")?;
        writeln!(f, "{:INDENT$}Certificates:", "")?;
        if self.certificates.is_empty() {
            writeln!(f, "{:INDENT2$}none", "")?;
        }
        for cert in &self.certificates {
            writeln!(f, "{:INDENT2$}{} (issued by {})", "", cert.subject, cert.issuer)?;
        }
        writeln!(f, "{:INDENT$}Private key:", "")?;
        match &self.private_key {
            Some(key) => writeln!(f, "{:INDENT2$}{}", "", key.algorithm),
            None => writeln!(f, "{:INDENT2$}none", ""),
        }
    }
}
