//! Remote addresses and the tiered target resolver.
//!
//! A [`RemoteAddress`] names a document inside the database as a
//! `(collection, filename)` pair. [`AddressResolver`] turns the arguments
//! of a store call into such a pair by consulting an ordered list of
//! [`ResolutionTier`]s.
//!
//! # Normalization
//!
//! - duplicate slashes are collapsed
//! - a collection always starts with `/` and never ends with one, unless it
//!   is exactly `/`
//! - a filename is never empty, never contains `/` and is never `.` or `..`

use crate::error::{ExistError, ExistResult};
use std::fmt;
use tracing::debug;

/// Location of a document in the database.
///
/// Addresses compare structurally: two addresses are equal when their
/// collection and filename are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteAddress {
    collection: String,
    filename: String,
}

impl RemoteAddress {
    /// Creates an address, normalizing both parts.
    ///
    /// A relative `collection` is taken relative to `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ExistError::InvalidPath`] if `filename` is not a valid
    /// filename.
    pub fn new(collection: &str, filename: &str) -> ExistResult<Self> {
        Ok(Self {
            collection: normalize_collection(collection),
            filename: normalize_filename(filename)?,
        })
    }

    /// Splits an absolute path into collection and filename.
    ///
    /// # Errors
    ///
    /// Returns [`ExistError::InvalidPath`] if the path has no final segment.
    pub fn from_path(path: &str) -> ExistResult<Self> {
        let normalized = normalize_collection(path);
        match normalized.rsplit_once('/') {
            Some((collection, filename)) if !filename.is_empty() => {
                let collection = if collection.is_empty() { "/" } else { collection };
                Self::new(collection, filename)
            }
            _ => Err(ExistError::invalid_path(path, "path has no filename")),
        }
    }

    /// Returns the collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the absolute path of the document.
    pub fn filepath(&self) -> String {
        join_path(&self.collection, &self.filename)
    }

    /// Returns a copy of this address with a different filename.
    ///
    /// # Errors
    ///
    /// Returns [`ExistError::InvalidPath`] if `filename` is not a valid
    /// filename.
    pub fn with_filename(&self, filename: &str) -> ExistResult<Self> {
        Ok(Self {
            collection: self.collection.clone(),
            filename: normalize_filename(filename)?,
        })
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filepath())
    }
}

/// Normalizes a collection path.
pub fn normalize_collection(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Validates a filename.
///
/// # Errors
///
/// Returns [`ExistError::InvalidPath`] if `name` is empty, contains `/`,
/// or is a `.` or `..` segment.
pub fn normalize_filename(name: &str) -> ExistResult<String> {
    if name.is_empty() {
        return Err(ExistError::invalid_path(name, "filename is empty"));
    }
    if name.contains('/') {
        return Err(ExistError::invalid_path(name, "filename contains '/'"));
    }
    if name == "." || name == ".." {
        return Err(ExistError::invalid_path(name, "filename is a dot segment"));
    }
    Ok(name.to_string())
}

/// Joins a collection and a relative path.
pub fn join_path(collection: &str, relative: &str) -> String {
    normalize_collection(&format!("{}/{}", collection, relative))
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn resolve_collection(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        normalize_collection(path)
    } else {
        join_path(base, path)
    }
}

/// Explicit target arguments of a single store call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressRequest<'a> {
    /// Target collection.
    pub collection: Option<&'a str>,
    /// Combined path; its directory part and filename override
    /// `collection` and `filename`.
    pub filepath: Option<&'a str>,
    /// Target filename.
    pub filename: Option<&'a str>,
}

/// A source of collection and filename values, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// Arguments passed to the current call.
    Explicit,
    /// The document's tracked address.
    Tracked,
    /// The client's root collection and the document's local origin.
    ClientDefault,
}

impl ResolutionTier {
    /// All tiers, highest precedence first.
    pub const ORDER: [ResolutionTier; 3] = [
        ResolutionTier::Explicit,
        ResolutionTier::Tracked,
        ResolutionTier::ClientDefault,
    ];
}

/// Computes the effective target of a store.
#[derive(Debug, Clone, Copy)]
pub struct AddressResolver<'a> {
    root_collection: &'a str,
    current: Option<&'a RemoteAddress>,
    origin: Option<&'a str>,
}

impl<'a> AddressResolver<'a> {
    /// Creates a resolver.
    ///
    /// `origin` is a filename derived from where the document came from
    /// locally, e.g. the name of the file it was read from.
    pub fn new(
        root_collection: &'a str,
        current: Option<&'a RemoteAddress>,
        origin: Option<&'a str>,
    ) -> Self {
        Self {
            root_collection,
            current,
            origin,
        }
    }

    /// Resolves the target address for `request`.
    ///
    /// # Errors
    ///
    /// - [`ExistError::AmbiguousTarget`] if no tier yields a filename
    /// - [`ExistError::InvalidPath`] if an explicit filename is malformed
    pub fn resolve(&self, request: &AddressRequest<'_>) -> ExistResult<RemoteAddress> {
        let (path_dir, path_name) = match request.filepath {
            Some(path) => split_filepath(path),
            None => (None, None),
        };

        let (base, collection_tier) = ResolutionTier::ORDER
            .iter()
            .find_map(|tier| self.collection_from(*tier, request).map(|c| (c, *tier)))
            .unwrap_or_else(|| {
                (
                    normalize_collection(self.root_collection),
                    ResolutionTier::ClientDefault,
                )
            });
        let collection = match path_dir {
            Some(dir) => resolve_collection(&base, dir),
            None => base,
        };

        let explicit_name = path_name.or(request.filename);
        let (filename, filename_tier) = ResolutionTier::ORDER
            .iter()
            .find_map(|tier| {
                self.filename_from(*tier, explicit_name)
                    .map(|name| (name, *tier))
            })
            .ok_or(ExistError::AmbiguousTarget)?;

        debug!(
            ?collection_tier,
            ?filename_tier,
            collection = %collection,
            filename = %filename,
            "resolved store target"
        );
        RemoteAddress::new(&collection, &filename)
    }

    fn collection_from(
        &self,
        tier: ResolutionTier,
        request: &AddressRequest<'_>,
    ) -> Option<String> {
        match tier {
            ResolutionTier::Explicit => request
                .collection
                .map(|c| resolve_collection(self.root_collection, c)),
            ResolutionTier::Tracked => self.current.map(|a| a.collection().to_string()),
            ResolutionTier::ClientDefault => Some(normalize_collection(self.root_collection)),
        }
    }

    fn filename_from(&self, tier: ResolutionTier, explicit: Option<&str>) -> Option<String> {
        match tier {
            ResolutionTier::Explicit => explicit.map(str::to_string),
            ResolutionTier::Tracked => self.current.map(|a| a.filename().to_string()),
            ResolutionTier::ClientDefault => self.origin.map(str::to_string),
        }
    }
}

/// Splits a filepath argument into an optional directory and filename.
fn split_filepath(path: &str) -> (Option<&str>, Option<&str>) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((dir, name)) => {
            let dir = if dir.is_empty() { "/" } else { dir };
            (Some(dir), (!name.is_empty()).then_some(name))
        }
        None => (None, (!trimmed.is_empty()).then_some(trimmed)),
    }
}
