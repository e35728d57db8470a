// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrases for encrypted private keys.

use std::env::{self, VarError};
use std::fmt;
use std::io;

use thiserror::Error;

use pem_content::Zeroizing;

pub const ENTER_PASSPHRASE_PROMPT: &str = "Passphrase for the encrypted private key: ";

pub const KEY_PASSPHRASE_ENV_VAR: &str = "PEM_KEY_PASSPHRASE";

pub const ENV_PASSPHRASE_WARNING: &str =
    "Warning: read the key passphrase from PEM_KEY_PASSPHRASE, which other processes may be able to see";

/// A passphrase, wiped from memory when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(..)")
    }
}

/// Where the passphrase for encrypted keys comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PassphraseSource {
    /// [`KEY_PASSPHRASE_ENV_VAR`]
    EnvVar,
    /// Asked for on the terminal, without echo
    Prompt,
    /// Supplied up front by the caller
    Given(Passphrase),
}

impl PassphraseSource {
    /// The source selected by the `--password-from-env` and `--prompt-password` flags.
    pub fn from_flags(from_env: bool, prompt: bool) -> Result<Option<Self>, PassphraseError> {
        match (from_env, prompt) {
            (true, true) => Err(PassphraseError::ConflictingSources),
            (true, false) => Ok(Some(Self::EnvVar)),
            (false, true) => Ok(Some(Self::Prompt)),
            (false, false) => Ok(None),
        }
    }

    pub fn read(&self) -> Result<Passphrase, PassphraseError> {
        match self {
            Self::EnvVar => match env::var(KEY_PASSPHRASE_ENV_VAR) {
                Ok(passphrase) => Ok(passphrase.into()),
                Err(VarError::NotPresent) => Err(PassphraseError::EnvVarMissing),
                Err(VarError::NotUnicode(_)) => Err(PassphraseError::EnvVarNotUnicode),
            },
            Self::Prompt => rpassword::prompt_password(ENTER_PASSPHRASE_PROMPT)
                .map(Passphrase::from)
                .map_err(PassphraseError::Prompt),
            Self::Given(passphrase) => Ok(passphrase.clone()),
        }
    }

    /// Printed after a passphrase has been taken from this source.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Self::EnvVar => Some(ENV_PASSPHRASE_WARNING),
            Self::Prompt | Self::Given(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PassphraseError {
    #[error("Please supply no more than one of --password-from-env, --prompt-password.")]
    ConflictingSources,
    #[error("Environment variable {KEY_PASSPHRASE_ENV_VAR} is not set")]
    EnvVarMissing,
    #[error("Environment variable {KEY_PASSPHRASE_ENV_VAR} is not valid unicode")]
    EnvVarNotUnicode,
    #[error("Could not prompt for passphrase: {0}")]
    Prompt(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_a_single_source() {
        assert_eq!(PassphraseSource::from_flags(false, false).unwrap(), None);
        assert_eq!(
            PassphraseSource::from_flags(true, false).unwrap(),
            Some(PassphraseSource::EnvVar)
        );
        assert_eq!(
            PassphraseSource::from_flags(false, true).unwrap(),
            Some(PassphraseSource::Prompt)
        );
        assert!(matches!(
            PassphraseSource::from_flags(true, true),
            Err(PassphraseError::ConflictingSources)
        ));
    }

    #[test]
    fn reads_passphrase_from_env() {
        let passphrase = temp_env::with_var(KEY_PASSPHRASE_ENV_VAR, Some("hunter2"), || {
            PassphraseSource::EnvVar.read()
        })
        .unwrap();
        assert_eq!(passphrase.as_str(), "hunter2");
    }

    #[test]
    fn unset_env_var_names_the_variable() {
        let err = temp_env::with_var_unset(KEY_PASSPHRASE_ENV_VAR, || {
            PassphraseSource::EnvVar.read()
        })
        .unwrap_err();
        assert!(matches!(err, PassphraseError::EnvVarMissing));
        assert!(err.to_string().contains(KEY_PASSPHRASE_ENV_VAR));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_env_var_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let value = OsStr::from_bytes(&[0x66, 0x6f, 0xff]);
        let err = temp_env::with_var(KEY_PASSPHRASE_ENV_VAR, Some(value), || {
            PassphraseSource::EnvVar.read()
        })
        .unwrap_err();
        assert!(matches!(err, PassphraseError::EnvVarNotUnicode));
    }

    #[test]
    fn given_passphrase_is_returned_each_time() {
        let source = PassphraseSource::Given("secret".into());
        assert_eq!(source.read().unwrap().as_str(), "secret");
        assert_eq!(source.read().unwrap().as_str(), "secret");
    }

    #[test]
    fn only_env_source_warns() {
        let warning = PassphraseSource::EnvVar.warning().unwrap();
        assert!(warning.contains(KEY_PASSPHRASE_ENV_VAR));
        assert_eq!(PassphraseSource::Prompt.warning(), None);
        assert_eq!(PassphraseSource::Given("x".into()).warning(), None);
    }

    #[test]
    fn debug_output_hides_the_passphrase() {
        let source = PassphraseSource::Given("secret".into());
        assert!(!format!("{source:?}").contains("secret"));
    }
}
