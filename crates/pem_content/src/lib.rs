// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PEM encoded certificates and private keys, supplied either inline or by reference to a file,
//! URL or class path resource.

mod certificate;
mod content;
mod error;
mod pem;
mod private_key;
mod resource;

pub use crate::certificate::{parse_certificates, Certificate};
pub use crate::content::PemContent;
pub use crate::error::{DecodeError, DecryptionError, KeyLoadError, ResolutionError, ResourceError};
pub use crate::pem::is_pem_formatted;
pub use crate::private_key::{
    parse_private_keys, parse_private_keys_with_password, KeyAlgorithm, PrivateKey,
};
pub use crate::resource::{
    DefaultResourceLoader, ResourceLoader, CLASSPATH_PREFIX, RESOURCE_PATH_ENV_VAR,
};
pub use pkcs8::der::zeroize::Zeroizing;

pub mod store;
pub mod test_helpers;
