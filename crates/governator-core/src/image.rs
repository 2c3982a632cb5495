//! Container image references.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed `[registry/]owner/repo:tag` image reference.
///
/// The full string is kept alongside the parsed parts because the cluster
/// service is pointed at the reference exactly as requested, registry included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    full: String,
    owner: String,
    repo: String,
    tag: String,
}

impl ImageReference {
    /// Parse an image reference.
    ///
    /// Exactly one `:` is allowed, separating the path from the tag. The path
    /// must have two (`owner/repo`) or three (`registry/owner/repo`) segments.
    /// Empty segments are rejected.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = || Error::InvalidImageReference(reference.to_string());

        let mut parts = reference.split(':');
        let (path, tag) = match (parts.next(), parts.next(), parts.next()) {
            (Some(path), Some(tag), None) => (path, tag),
            _ => return Err(invalid()),
        };

        let segments: Vec<&str> = path.split('/').collect();
        let (owner, repo) = match segments.as_slice() {
            [owner, repo] => (*owner, *repo),
            [_registry, owner, repo] => (*owner, *repo),
            _ => return Err(invalid()),
        };

        if owner.is_empty() || repo.is_empty() || tag.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            full: reference.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            tag: tag.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name. Doubles as the cluster service name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The reference exactly as it was requested.
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for ImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
