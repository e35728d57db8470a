// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use der::asn1::AnyRef;
use der::{Decode, Encode};
use pem::Pem;
use pkcs8::der::zeroize::Zeroizing;
use pkcs8::pkcs5;
use pkcs8::{
    AlgorithmIdentifierRef, EncryptedPrivateKeyInfo, ObjectIdentifier, PrivateKeyInfo,
    SecretDocument,
};
use tracing::debug;

use crate::error::{DecodeError, DecryptionError, KeyLoadError};
use crate::pem::{encode_block, parse_blocks};

const PKCS8_TAG: &str = "PRIVATE KEY";
const PKCS1_RSA_TAG: &str = "RSA PRIVATE KEY";
const SEC1_EC_TAG: &str = "EC PRIVATE KEY";
const ENCRYPTED_PKCS8_TAG: &str = "ENCRYPTED PRIVATE KEY";

const PROC_TYPE_HEADER: &str = "Proc-Type";
const DEK_INFO_HEADER: &str = "DEK-Info";

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const RSASSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const DSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10040.4.1");
const X25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.110");
const X448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.111");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");
const ED448: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.113");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    RsaPss,
    Ec,
    Dsa,
    Ed25519,
    Ed448,
    X25519,
    X448,
    Other(ObjectIdentifier),
}

const KNOWN_ALGORITHMS: [(ObjectIdentifier, KeyAlgorithm); 8] = [
    (RSA_ENCRYPTION, KeyAlgorithm::Rsa),
    (RSASSA_PSS, KeyAlgorithm::RsaPss),
    (EC_PUBLIC_KEY, KeyAlgorithm::Ec),
    (DSA, KeyAlgorithm::Dsa),
    (ED25519, KeyAlgorithm::Ed25519),
    (ED448, KeyAlgorithm::Ed448),
    (X25519, KeyAlgorithm::X25519),
    (X448, KeyAlgorithm::X448),
];

impl From<ObjectIdentifier> for KeyAlgorithm {
    fn from(oid: ObjectIdentifier) -> Self {
        KNOWN_ALGORITHMS
            .iter()
            .find(|(known, _)| *known == oid)
            .map(|(_, algorithm)| *algorithm)
            .unwrap_or(Self::Other(oid))
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => write!(f, "RSA"),
            Self::RsaPss => write!(f, "RSASSA-PSS"),
            Self::Ec => write!(f, "EC"),
            Self::Dsa => write!(f, "DSA"),
            Self::Ed25519 => write!(f, "Ed25519"),
            Self::Ed448 => write!(f, "Ed448"),
            Self::X25519 => write!(f, "X25519"),
            Self::X448 => write!(f, "X448"),
            Self::Other(oid) => write!(f, "{oid}"),
        }
    }
}

/// A private key, held as a PKCS#8 `PrivateKeyInfo` document whatever envelope it was read from.
///
/// The document is zeroized on drop.
#[derive(Clone)]
pub struct PrivateKey {
    document: SecretDocument,
    algorithm: ObjectIdentifier,
}

impl PrivateKey {
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, DecodeError> {
        let info = PrivateKeyInfo::try_from(der)?;
        let algorithm = info.algorithm.oid;
        let document = SecretDocument::try_from(der)?;
        Ok(Self {
            document,
            algorithm,
        })
    }

    /// Wraps a PKCS#1 `RSAPrivateKey` in a PKCS#8 envelope.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, DecodeError> {
        pkcs1::RsaPrivateKey::from_der(der)?;
        let algorithm = AlgorithmIdentifierRef {
            oid: RSA_ENCRYPTION,
            parameters: Some(AnyRef::NULL),
        };
        Self::wrap(algorithm, der)
    }

    /// Wraps a SEC1 `ECPrivateKey` in a PKCS#8 envelope, naming the curve from the key's own
    /// parameters.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self, DecodeError> {
        let ec_key = sec1::EcPrivateKey::from_der(der)?;
        let curve = ec_key
            .parameters
            .and_then(|parameters| parameters.named_curve())
            .ok_or(DecodeError::MissingEcParameters)?;
        let algorithm = AlgorithmIdentifierRef {
            oid: EC_PUBLIC_KEY,
            parameters: Some(AnyRef::from(&curve)),
        };
        Self::wrap(algorithm, der)
    }

    fn wrap(algorithm: AlgorithmIdentifierRef<'_>, key: &[u8]) -> Result<Self, DecodeError> {
        let info = PrivateKeyInfo::new(algorithm, key);
        let der = Zeroizing::new(info.to_der()?);
        Self::from_pkcs8_der(&der)
    }

    /// Decrypts a PKCS#8 `EncryptedPrivateKeyInfo`.
    pub fn from_encrypted_pkcs8_der(
        der: &[u8],
        password: impl AsRef<[u8]>,
    ) -> Result<Self, KeyLoadError> {
        let encrypted = EncryptedPrivateKeyInfo::try_from(der).map_err(DecodeError::from)?;
        let document = encrypted.decrypt(password).map_err(|err| match err {
            pkcs8::Error::EncryptedPrivateKey(
                err @ (pkcs5::Error::UnsupportedAlgorithm { .. }
                | pkcs5::Error::AlgorithmParametersInvalid { .. }
                | pkcs5::Error::NoPbes1CryptSupport),
            ) => KeyLoadError::Decode(DecodeError::UnsupportedEncryption(err.to_string())),
            // Bad padding and undecodable plaintext both mean the password was wrong.
            _ => KeyLoadError::Decrypt(DecryptionError),
        })?;
        Self::from_pkcs8_der(document.as_bytes()).map_err(|_| DecryptionError.into())
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm.into()
    }

    pub fn algorithm_oid(&self) -> ObjectIdentifier {
        self.algorithm
    }

    pub fn to_pkcs8_der(&self) -> &[u8] {
        self.document.as_bytes()
    }

    pub fn to_pkcs8_pem(&self) -> Zeroizing<String> {
        Zeroizing::new(encode_block(PKCS8_TAG, self.document.as_bytes().to_vec()))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.document.as_bytes() == other.document.as_bytes()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("key", &"omitted for security")
            .finish()
    }
}

/// Decodes every unencrypted private key block in `text`, in the order they appear.
///
/// Supports PKCS#8 (`PRIVATE KEY`), PKCS#1 (`RSA PRIVATE KEY`) and SEC1 (`EC PRIVATE KEY`).
/// Encountering an `ENCRYPTED PRIVATE KEY` block is an error, since there is no password to
/// decrypt it with.
pub fn parse_private_keys(text: &str) -> Result<Vec<PrivateKey>, KeyLoadError> {
    parse(text, None)
}

/// Like [`parse_private_keys`], but decrypts `ENCRYPTED PRIVATE KEY` blocks with `password`.
///
/// Unencrypted blocks ignore the password. A wrong password is a [`KeyLoadError::Decrypt`].
pub fn parse_private_keys_with_password(
    text: &str,
    password: impl AsRef<[u8]>,
) -> Result<Vec<PrivateKey>, KeyLoadError> {
    parse(text, Some(password.as_ref()))
}

fn parse(text: &str, password: Option<&[u8]>) -> Result<Vec<PrivateKey>, KeyLoadError> {
    let mut keys = Vec::new();
    for block in parse_blocks(text)? {
        if let Some(key) = parse_block(&block, password)? {
            keys.push(key);
        }
    }
    Ok(keys)
}

fn parse_block(block: &Pem, password: Option<&[u8]>) -> Result<Option<PrivateKey>, KeyLoadError> {
    let contents = block.contents();
    let key = match block.tag() {
        PKCS8_TAG => PrivateKey::from_pkcs8_der(contents)?,
        PKCS1_RSA_TAG => {
            reject_legacy_encryption(block)?;
            PrivateKey::from_pkcs1_der(contents)?
        }
        SEC1_EC_TAG => {
            reject_legacy_encryption(block)?;
            PrivateKey::from_sec1_der(contents)?
        }
        ENCRYPTED_PKCS8_TAG => {
            let password = password.ok_or(DecodeError::PasswordRequired)?;
            PrivateKey::from_encrypted_pkcs8_der(contents, password)?
        }
        other => {
            debug!("skipping PEM block '{other}' while looking for private keys");
            return Ok(None);
        }
    };
    Ok(Some(key))
}

/// OpenSSL's pre-PKCS#8 encryption puts `Proc-Type: 4,ENCRYPTED` in the block headers.
fn reject_legacy_encryption(block: &Pem) -> Result<(), DecodeError> {
    let headers = block.headers();
    match headers.get(PROC_TYPE_HEADER) {
        Some(proc_type) if proc_type.contains("ENCRYPTED") => {
            let cipher = headers.get(DEK_INFO_HEADER).unwrap_or("unknown cipher");
            Err(DecodeError::UnsupportedEncryption(format!(
                "legacy OpenSSL encrypted {} ({cipher})",
                block.tag()
            )))
        }
        _ => Ok(()),
    }
}
