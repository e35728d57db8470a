// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opening the resources that PEM content can be read from.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::error::ResourceError;

pub const CLASSPATH_PREFIX: &str = "classpath:";

/// Environment variable holding extra resource roots, using the platform's path list syntax.
pub const RESOURCE_PATH_ENV_VAR: &str = "PEM_CONTENT_RESOURCE_PATH";

const FILE_SCHEME: &str = "file";
const FILE_PREFIX: &str = "file:";
const HTTP_SCHEMES: [&str; 2] = ["http", "https"];

pub trait ResourceLoader {
    /// Opens `locator` for reading. The returned reader is owned by the caller and closed when
    /// dropped.
    fn open(&self, locator: &str) -> Result<Box<dyn Read>, ResourceError>;
}

/// Resolves `classpath:` references against a list of resource roots, `file:` URLs and plain
/// paths against the local file system, and (with the `remote` feature) `http(s):` URLs over
/// the network.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultResourceLoader {
    roots: Vec<PathBuf>,
}

impl DefaultResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader whose resource roots are read from [`RESOURCE_PATH_ENV_VAR`].
    pub fn from_env() -> Self {
        let roots = std::env::var_os(RESOURCE_PATH_ENV_VAR)
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { roots }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn open_classpath(&self, name: &str) -> Result<Box<dyn Read>, ResourceError> {
        let relative = name.trim_start_matches('/');
        // Names stay inside their root.
        let escapes_root = Path::new(relative)
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            debug!("refusing class path resource {relative} outside its root");
            return Err(ResourceError::ClasspathResourceNotFound(relative.to_owned()));
        }
        let path = self
            .roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ResourceError::ClasspathResourceNotFound(relative.to_owned()))?;
        debug!("found class path resource {relative} at {}", path.display());
        open_file(&path)
    }

    fn open_url(&self, locator: &str, scheme: &str) -> Result<Box<dyn Read>, ResourceError> {
        let url = Url::parse(locator).map_err(|err| ResourceError::InvalidUrl(err.to_string()))?;
        if scheme == FILE_SCHEME {
            let path = url
                .to_file_path()
                .map_err(|_| ResourceError::InvalidUrl(locator.to_owned()))?;
            return open_file(&path);
        }
        open_remote(url)
    }
}

impl ResourceLoader for DefaultResourceLoader {
    fn open(&self, locator: &str) -> Result<Box<dyn Read>, ResourceError> {
        if let Some(name) = locator.strip_prefix(CLASSPATH_PREFIX) {
            return self.open_classpath(name);
        }
        if let Some(path) = file_prefixed_path(locator) {
            return open_file(Path::new(path));
        }
        match url_scheme(locator) {
            Some(scheme) => self.open_url(locator, &scheme),
            None => open_file(Path::new(locator)),
        }
    }
}

/// The scheme of `locator` if it is one this loader treats as a URL.
///
/// Other `something:` prefixes (including Windows drive letters) are left to be read as paths.
fn url_scheme(locator: &str) -> Option<String> {
    let (scheme, _) = locator.split_once(':')?;
    let scheme = scheme.to_ascii_lowercase();
    (scheme == FILE_SCHEME || HTTP_SCHEMES.contains(&scheme.as_str())).then_some(scheme)
}

/// The path in a `file:` locator with no `//` authority, such as `file:certs/server.crt`.
///
/// These are file system paths, relative to the working directory unless absolute. Parsing
/// them as URLs would root them at `/`.
pub(crate) fn file_prefixed_path(locator: &str) -> Option<&str> {
    let prefix = locator.get(..FILE_PREFIX.len())?;
    let path = &locator[FILE_PREFIX.len()..];
    (prefix.eq_ignore_ascii_case(FILE_PREFIX) && !path.starts_with("//")).then_some(path)
}

pub(crate) fn is_url(locator: &str) -> bool {
    url_scheme(locator).is_some()
}

fn open_file(path: &Path) -> Result<Box<dyn Read>, ResourceError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ResourceError::NotFound(path.to_owned()),
        _ => ResourceError::Io {
            path: path.to_owned(),
            source: err,
        },
    })?;
    Ok(Box::new(file))
}

#[cfg(feature = "remote")]
fn open_remote(url: Url) -> Result<Box<dyn Read>, ResourceError> {
    debug!("fetching {url}");
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|err| ResourceError::Http(err.to_string()))?;
    Ok(Box::new(response))
}

#[cfg(not(feature = "remote"))]
fn open_remote(url: Url) -> Result<Box<dyn Read>, ResourceError> {
    Err(ResourceError::UnsupportedScheme(url.scheme().to_owned()))
}
