//! Schema document locations
//!
//! Documents are identified by the location the caller supplied them under.
//! `schemaLocation` values in import/include directives are resolved against
//! the location of the document that declares them, so a caller can key its
//! documents by URL or by relative path and have both work.

use std::path::{Component, Path, PathBuf};
use url::Url;

/// Resource location - either a URL or a path-like identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// URL (http, https, file, urn, ...)
    Url(Url),
    /// File system path or any other opaque identifier
    Path(PathBuf),
}

impl Location {
    /// Create a location from a string (auto-detect type)
    pub fn parse(s: &str) -> Self {
        match Url::parse(s) {
            // Single-letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => Location::Url(url),
            _ => Location::Path(PathBuf::from(s)),
        }
    }

    /// Resolve `reference` relative to this location
    pub fn join(&self, reference: &str) -> Location {
        let target = Location::parse(reference);
        if matches!(target, Location::Url(_)) {
            return target;
        }
        match self {
            Location::Url(base) => match base.join(reference) {
                Ok(url) => Location::Url(url),
                Err(_) => target,
            },
            Location::Path(base) => {
                let reference = Path::new(reference);
                if reference.is_absolute() {
                    return Location::Path(normalize(reference));
                }
                let dir = base.parent().unwrap_or_else(|| Path::new(""));
                Location::Path(normalize(&dir.join(reference)))
            }
        }
    }

    /// Last path segment, used as a fallback match key
    pub fn file_name(&self) -> Option<String> {
        match self {
            Location::Url(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
                .filter(|s| !s.is_empty()),
            Location::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string()),
        }
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Url(u) => u.to_string(),
            Location::Path(p) => p.to_string_lossy().replace('\\', "/"),
        }
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }
}

/// Lexically collapse `.` and `..` segments
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc = Location::parse("http://www.sap.com/adt/core.xsd");
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc = Location::parse("schemas/adt/interface.xsd");
        assert!(matches!(loc, Location::Path(_)));
        assert_eq!(loc.file_name().as_deref(), Some("interface.xsd"));
    }

    #[test]
    fn test_join_relative_path() {
        let base = Location::parse("schemas/oo/interface.xsd");
        assert_eq!(base.join("../core/adtcore.xsd").as_str(), "schemas/core/adtcore.xsd");
        assert_eq!(base.join("./classes.xsd").as_str(), "schemas/oo/classes.xsd");
    }

    #[test]
    fn test_join_bare_name() {
        let base = Location::parse("interface.xsd");
        assert_eq!(base.join("adtcore.xsd").as_str(), "adtcore.xsd");
    }

    #[test]
    fn test_join_url() {
        let base = Location::parse("http://example.com/schemas/oo/interface.xsd");
        assert_eq!(
            base.join("../core/adtcore.xsd").as_str(),
            "http://example.com/schemas/core/adtcore.xsd"
        );
        assert_eq!(base.file_name().as_deref(), Some("interface.xsd"));
    }
}
