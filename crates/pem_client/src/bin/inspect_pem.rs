// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use std::io::stderr;
use std::io::stdout;
use tracing_subscriber::EnvFilter;

use pem_client::shims::inspect_pem;

fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(stderr)
        .init();

    let opts = inspect_pem::InspectPemOpts::parse();
    inspect_pem::main(&opts, &mut stdout(), &mut stderr())
}
