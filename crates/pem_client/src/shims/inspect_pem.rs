// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Functionality for inspecting PEM encoded certificates, private keys and certificate stores

use std::{io::Write, path::PathBuf};

use clap::{crate_version, Parser, Subcommand};
use tracing::debug;

use pem_content::store::PemStoreConfig;
use pem_content::{DefaultResourceLoader, PemContent};

use crate::inspect::{
    format_multiple_items, FormatMethod, Formattable, NO_CERTIFICATES_TEXT, NO_PRIVATE_KEYS_TEXT,
};
use crate::passphrase::{Passphrase, PassphraseSource};

use super::error::PemCliError;

#[derive(Debug, Parser)]
#[clap(
    name = "pem-inspect",
    about = "Inspects PEM encoded certificates and private keys given inline, by path, by URL or as a classpath: reference",
    version = crate_version!()
)]
pub struct InspectPemOpts {
    #[clap(subcommand)]
    pub target: Target,
    #[clap(
        global = true,
        long,
        help = "How to display results [default: plain-digest] [possible values: plain-digest, json-digest]",
        default_value = "plain-digest"
    )]
    pub format: FormatMethod,
    #[clap(
        global = true,
        long,
        help = "Read the passphrase for encrypted keys from the PEM_KEY_PASSPHRASE environment variable"
    )]
    pub password_from_env: bool,
    #[clap(global = true, long, help = "Prompt for the passphrase for encrypted keys")]
    pub prompt_password: bool,
    #[clap(
        global = true,
        long = "resource-root",
        help = "Directory searched for classpath: references. May be given more than once"
    )]
    pub resource_roots: Vec<PathBuf>,
}

/// The data type being inspected
#[derive(Debug, Subcommand)]
pub enum Target {
    /// List the certificates found in PEM content
    Certificates {
        #[clap(help = "Inline PEM, file path, URL or classpath: reference")]
        source: String,
    },
    /// List the private keys found in PEM content
    Keys {
        #[clap(help = "Inline PEM, file path, URL or classpath: reference")]
        source: String,
    },
    /// Load a certificate and private key pair described by a TOML file
    Store {
        #[clap(
            help = "Path of a TOML file with certificate, private_key and private_key_password entries"
        )]
        config: PathBuf,
    },
}

pub fn main<W: Write, E: Write>(
    opts: &InspectPemOpts,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<(), std::io::Error> {
    let result = PassphraseSource::from_flags(opts.password_from_env, opts.prompt_password)
        .map_err(PemCliError::from)
        .and_then(|source| run(opts, source.as_ref()));
    match result {
        Ok((display_text, warning)) => {
            if let Some(warning) = warning {
                writeln!(stderr, "{warning}")?;
            }
            writeln!(stdout, "{display_text}")
        }
        Err(err) => writeln!(stderr, "{err}"),
    }
}

/// Reads the passphrase, along with any warning its source calls for.
fn read_passphrase(
    source: Option<&PassphraseSource>,
) -> Result<(Option<Passphrase>, Option<&'static str>), PemCliError> {
    match source {
        Some(source) => Ok((Some(source.read()?), source.warning())),
        None => Ok((None, None)),
    }
}

fn run(
    opts: &InspectPemOpts,
    passphrase_source: Option<&PassphraseSource>,
) -> Result<(String, Option<&'static str>), PemCliError> {
    let loader = opts
        .resource_roots
        .iter()
        .fold(DefaultResourceLoader::from_env(), |loader, root| {
            loader.with_root(root)
        });
    debug!("resource roots: {:?}", loader.roots());
    let format_method = &opts.format;

    match &opts.target {
        Target::Certificates { source } => {
            let certs = match PemContent::load_with(Some(source.as_str()), &loader)? {
                Some(content) => content.certificates()?,
                None => Vec::new(),
            };
            if certs.is_empty() {
                return Ok((NO_CERTIFICATES_TEXT.to_owned(), None));
            }
            let display_text = format_multiple_items(certs, format_method)?;
            Ok((display_text, None))
        }
        Target::Keys { source } => {
            let content = PemContent::load_with(Some(source.as_str()), &loader)?;
            let (passphrase, warning) = read_passphrase(passphrase_source)?;
            let keys = match (content, passphrase) {
                (Some(content), Some(passphrase)) => {
                    content.private_keys_with_password(passphrase.as_str())?
                }
                (Some(content), None) => content.private_keys()?,
                (None, _) => Vec::new(),
            };
            if keys.is_empty() {
                return Ok((NO_PRIVATE_KEYS_TEXT.to_owned(), warning));
            }
            let display_text = format_multiple_items(keys, format_method)?;
            Ok((display_text, warning))
        }
        Target::Store { config } => {
            let mut config = PemStoreConfig::from_toml_file(config)?;
            let (passphrase, warning) = read_passphrase(passphrase_source)?;
            if let Some(passphrase) = passphrase {
                config.private_key_password = Some(passphrase.as_str().to_owned());
            }
            let store = config.load_with(&loader)?;
            let display_text = store.format(format_method)?;
            Ok((display_text, warning))
        }
    }
}
