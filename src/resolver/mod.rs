//! Resource resolution
//!
//! Classifies a user-supplied string (a MangaDex URL, a prefixed id or a bare UUID) into a
//! series or chapter reference. This is a pure function with no I/O.

use crate::ArchiverError;
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Hosts that serve catalog resources
const CATALOG_HOSTS: &[&str] = &["mangadex.org", "www.mangadex.org", "api.mangadex.org"];

/// Public site base used to build human-facing chapter links
pub const SITE_BASE_URL: &str = "https://mangadex.org";

/// Kind of catalog resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Series,
    Chapter,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Chapter => write!(f, "chapter"),
        }
    }
}

/// A resolved catalog resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub id: String,
}

/// Resolves an input string to a catalog resource
///
/// # Accepted forms
///
/// | Input | Result |
/// |-------|--------|
/// | `https://mangadex.org/title/{uuid}/some-slug` | Series |
/// | `https://api.mangadex.org/manga/{uuid}` | Series |
/// | `https://mangadex.org/chapter/{uuid}/3` | Chapter |
/// | `title:{uuid}` / `series:{uuid}` | Series |
/// | `chapter:{uuid}` | Chapter |
/// | `{uuid}` | Series |
///
/// # Examples
///
/// ```
/// use mdex_archiver::resolver::{resolve, ResourceKind};
///
/// let resource = resolve("https://mangadex.org/chapter/56eecc6f-1a4e-464c-b6a4-a1cbdfdfd726").unwrap();
/// assert_eq!(resource.kind, ResourceKind::Chapter);
/// assert_eq!(resource.id, "56eecc6f-1a4e-464c-b6a4-a1cbdfdfd726");
/// ```
pub fn resolve(input: &str) -> Result<Resource, ArchiverError> {
    let input = input.trim();
    let unrecognized = || ArchiverError::Resolution {
        input: input.to_string(),
    };

    if let Some((prefix, rest)) = input.split_once(':') {
        let kind = match prefix.to_ascii_lowercase().as_str() {
            "title" | "series" | "manga" => Some(ResourceKind::Series),
            "chapter" => Some(ResourceKind::Chapter),
            _ => None,
        };

        if let Some(kind) = kind {
            return normalize_id(rest)
                .map(|id| Resource { kind, id })
                .ok_or_else(unrecognized);
        }

        return resolve_url(input).ok_or_else(unrecognized);
    }

    normalize_id(input)
        .map(|id| Resource {
            kind: ResourceKind::Series,
            id,
        })
        .ok_or_else(unrecognized)
}

/// Builds the public URL of a chapter
pub fn chapter_url(chapter_id: &str) -> String {
    format!("{}/chapter/{}", SITE_BASE_URL, chapter_id)
}

fn resolve_url(input: &str) -> Option<Resource> {
    let url = Url::parse(input).ok()?;

    if !matches!(url.scheme(), "http" | "https") || !is_catalog_host(url.host_str()?) {
        return None;
    }

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let kind = match segments.next()? {
        "title" | "manga" => ResourceKind::Series,
        "chapter" => ResourceKind::Chapter,
        _ => return None,
    };
    let id = normalize_id(segments.next()?)?;

    Some(Resource { kind, id })
}

fn is_catalog_host(host: &str) -> bool {
    CATALOG_HOSTS
        .iter()
        .any(|candidate| host.eq_ignore_ascii_case(candidate))
}

/// Accepts only the hyphenated UUID form and returns it lowercased
fn normalize_id(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.len() != 36 {
        return None;
    }

    Uuid::parse_str(candidate)
        .ok()
        .map(|uuid| uuid.hyphenated().to_string())
}

/// Returns true if the value is a hyphenated UUID
pub fn is_uuid(value: &str) -> bool {
    normalize_id(value).is_some()
}
