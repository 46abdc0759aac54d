//! Content type resolution.

use std::path::Path;

use crate::delivery::headers::GENERIC_BINARY_TYPE;

/// Resolves a content type for a file path.
///
/// A seam rather than a function so the orchestrator can be tested with a
/// fixed resolver and hosts can plug in their own lookup.
pub trait MimeResolver: Send + Sync {
    /// Returns the content type to serve the file under.
    fn resolve(&self, path: &Path) -> String;
}

/// Extension-based resolver backed by the shared MIME database.
#[derive(Debug, Clone, Default)]
pub struct GuessMimeResolver;

impl MimeResolver for GuessMimeResolver {
    fn resolve(&self, path: &Path) -> String {
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(GENERIC_BINARY_TYPE)
            .to_string()
    }
}

/// Resolver that always answers with one configured type.
#[derive(Debug, Clone)]
pub struct FixedMimeResolver {
    mime: String,
}

impl FixedMimeResolver {
    pub fn new(mime: impl Into<String>) -> Self {
        Self { mime: mime.into() }
    }
}

impl MimeResolver for FixedMimeResolver {
    fn resolve(&self, _path: &Path) -> String {
        self.mime.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_resolver_known_extensions() {
        let resolver = GuessMimeResolver;

        assert_eq!(resolver.resolve(Path::new("movie.mp4")), "video/mp4");
        assert_eq!(resolver.resolve(Path::new("report.pdf")), "application/pdf");
        assert_eq!(resolver.resolve(Path::new("page.html")), "text/html");
    }

    #[test]
    fn test_guess_resolver_unknown_extension_is_binary() {
        let resolver = GuessMimeResolver;

        assert_eq!(
            resolver.resolve(Path::new("payload.sluice")),
            GENERIC_BINARY_TYPE
        );
        assert_eq!(resolver.resolve(Path::new("no_extension")), GENERIC_BINARY_TYPE);
    }

    #[test]
    fn test_fixed_resolver_ignores_path() {
        let resolver = FixedMimeResolver::new("audio/flac");

        assert_eq!(resolver.resolve(Path::new("anything.mp4")), "audio/flac");
    }
}
