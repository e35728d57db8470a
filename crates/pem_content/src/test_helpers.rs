// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to the PEM fixtures under `test/pem` at the workspace root.

use std::fs;
use std::path::PathBuf;

/// Password protecting the encrypted key fixtures.
pub const FIXTURE_PASSWORD: &str = "test";

/// Appears in the subject of `server.crt` and the first certificate of `chain.crt`.
pub const SERVER_COMMON_NAME: &str = "CN=localhost";

/// Appears in the subject of `ca.crt` and the issuer of `server.crt`.
pub const CA_COMMON_NAME: &str = "CN=Test CA";

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../test/pem"))
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("could not read {path:?}: {err}"))
}
