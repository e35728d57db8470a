// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use der::{Decode, Encode};
use tracing::debug;

use crate::error::DecodeError;
use crate::pem::{encode_block, parse_blocks};

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// An X.509 certificate decoded from a PEM block.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    inner: x509_cert::Certificate,
    der: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, DecodeError> {
        let der = der.into();
        let inner = x509_cert::Certificate::from_der(&der)?;
        Ok(Self { inner, der })
    }

    pub fn as_x509(&self) -> &x509_cert::Certificate {
        &self.inner
    }

    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> String {
        encode_block(CERTIFICATE_TAG, self.der.clone())
    }

    /// Subject distinguished name, RFC 4514 style.
    pub fn subject(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    pub fn issuer(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// Serial number as lowercase hex.
    pub fn serial_number(&self) -> String {
        hex::encode(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    pub fn not_before(&self) -> String {
        self.inner
            .tbs_certificate
            .validity
            .not_before
            .to_date_time()
            .to_string()
    }

    pub fn not_after(&self) -> String {
        self.inner
            .tbs_certificate
            .validity
            .not_after
            .to_date_time()
            .to_string()
    }

    pub fn is_self_issued(&self) -> bool {
        self.inner.tbs_certificate.subject == self.inner.tbs_certificate.issuer
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject())
            .field("issuer", &self.issuer())
            .field("serial_number", &self.serial_number())
            .finish()
    }
}

impl TryFrom<x509_cert::Certificate> for Certificate {
    type Error = DecodeError;

    fn try_from(inner: x509_cert::Certificate) -> Result<Self, Self::Error> {
        let der = inner.to_der()?;
        Ok(Self { inner, der })
    }
}

/// Decodes every certificate block in `text`, in the order they appear.
///
/// Blocks with other labels (private keys, certificate requests, ...) are skipped. Returns an
/// empty `Vec` if there are no certificates. A certificate block that cannot be decoded fails the
/// whole call.
pub fn parse_certificates(text: &str) -> Result<Vec<Certificate>, DecodeError> {
    parse_blocks(text)?
        .into_iter()
        .filter(|block| {
            let is_cert = is_certificate_tag(block.tag());
            if !is_cert {
                debug!("skipping non-certificate PEM block '{}'", block.tag());
            }
            is_cert
        })
        .map(|block| Certificate::from_der(block.into_contents()))
        .collect()
}

/// Matches `CERTIFICATE` along with prefixed variants such as `X509 CERTIFICATE` and
/// `TRUSTED CERTIFICATE`.
fn is_certificate_tag(tag: &str) -> bool {
    tag.to_ascii_uppercase().ends_with(CERTIFICATE_TAG)
}
