//! Reference sanitization and directory containment.
//!
//! External clients address files by reference strings. Before anything
//! touches the filesystem, a reference is checked against a configured
//! pseudo-protocol denylist and stripped of traversal components, and the
//! resulting path is confirmed to live under the serving root. The denylist
//! is an explicit configuration value owned by the host, not process-global
//! state.

use std::path::{Component, Path, PathBuf};

/// Sanitization policy for client-supplied file references.
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Pseudo-protocol schemes a reference may never start with
    pub denied_schemes: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            denied_schemes: ["javascript", "vbscript", "data", "file", "phar"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Reasons a file reference is rejected before filesystem access.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Reference uses denied scheme: {scheme}")]
    DeniedScheme { scheme: String },

    #[error("Reference contains traversal components: {reference}")]
    Traversal { reference: String },

    #[error("Reference is empty or escapes the serving root")]
    OutsideRoot,
}

/// Validates a client-supplied reference and returns it in relative form.
///
/// Rejects NUL bytes, configured pseudo-protocol schemes, and parent-dir
/// traversal components. Leading slashes are stripped so the result always
/// joins below a root directory.
///
/// # Errors
///
/// - `PathError::DeniedScheme` - Reference starts with a denylisted scheme
/// - `PathError::Traversal` - Reference contains `..` or a NUL byte
/// - `PathError::OutsideRoot` - Nothing remains after stripping
pub fn sanitize_reference(raw: &str, config: &SanitizeConfig) -> Result<String, PathError> {
    if raw.contains('\0') {
        return Err(PathError::Traversal {
            reference: raw.to_string(),
        });
    }

    let lowered = raw.to_lowercase();
    for scheme in &config.denied_schemes {
        if lowered.starts_with(&format!("{scheme}:")) {
            return Err(PathError::DeniedScheme {
                scheme: scheme.clone(),
            });
        }
    }

    let trimmed = raw.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(PathError::OutsideRoot);
    }

    let has_traversal = Path::new(trimmed)
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if has_traversal {
        return Err(PathError::Traversal {
            reference: raw.to_string(),
        });
    }

    Ok(trimmed.to_string())
}

/// Checks that a path resolves to a location under the given root.
///
/// Both sides are canonicalized, so symlinks pointing outside the root are
/// caught as well. A path that cannot be canonicalized (typically because
/// it does not exist) is treated as outside.
pub fn is_within_root(path: &Path, root: &Path) -> bool {
    let Ok(canonical_root) = root.canonicalize() else {
        return false;
    };
    let Ok(canonical_path) = path.canonicalize() else {
        return false;
    };
    canonical_path.starts_with(&canonical_root)
}

/// Joins a sanitized reference onto the serving root.
pub fn resolve_under_root(reference: &str, root: &Path) -> PathBuf {
    root.join(reference)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_plain_reference_passes() {
        let config = SanitizeConfig::default();

        assert_eq!(sanitize_reference("data.bin", &config).unwrap(), "data.bin");
        assert_eq!(
            sanitize_reference("reports/2024/q3.pdf", &config).unwrap(),
            "reports/2024/q3.pdf"
        );
    }

    #[test]
    fn test_leading_slashes_are_stripped() {
        let config = SanitizeConfig::default();

        assert_eq!(sanitize_reference("/data.bin", &config).unwrap(), "data.bin");
        assert_eq!(sanitize_reference("//data.bin", &config).unwrap(), "data.bin");
    }

    #[test]
    fn test_denied_schemes_are_rejected() {
        let config = SanitizeConfig::default();

        assert!(matches!(
            sanitize_reference("file:/etc/passwd", &config),
            Err(PathError::DeniedScheme { .. })
        ));
        assert!(matches!(
            sanitize_reference("DATA:text/html,hi", &config),
            Err(PathError::DeniedScheme { .. })
        ));
    }

    #[test]
    fn test_custom_denylist_is_honored() {
        let config = SanitizeConfig {
            denied_schemes: vec!["custom".to_string()],
        };

        assert!(sanitize_reference("custom:thing", &config).is_err());
        // The default list no longer applies once the host supplies its own
        assert!(sanitize_reference("file:thing", &config).is_ok());
    }

    #[test]
    fn test_traversal_is_rejected() {
        let config = SanitizeConfig::default();

        assert!(matches!(
            sanitize_reference("../secret.txt", &config),
            Err(PathError::Traversal { .. })
        ));
        assert!(matches!(
            sanitize_reference("reports/../../secret.txt", &config),
            Err(PathError::Traversal { .. })
        ));
    }

    #[test]
    fn test_nul_byte_is_rejected() {
        let config = SanitizeConfig::default();

        assert!(sanitize_reference("data\0.bin", &config).is_err());
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        let config = SanitizeConfig::default();

        assert!(matches!(
            sanitize_reference("", &config),
            Err(PathError::OutsideRoot)
        ));
        assert!(matches!(
            sanitize_reference("///", &config),
            Err(PathError::OutsideRoot)
        ));
    }

    #[test]
    fn test_containment_check() {
        let root = TempDir::new().unwrap();
        let inside = root.path().join("data.bin");
        std::fs::write(&inside, b"x").unwrap();

        let outside = TempDir::new().unwrap();
        let elsewhere = outside.path().join("other.bin");
        std::fs::write(&elsewhere, b"x").unwrap();

        assert!(is_within_root(&inside, root.path()));
        assert!(!is_within_root(&elsewhere, root.path()));
        // Nonexistent paths cannot be confirmed inside
        assert!(!is_within_root(&root.path().join("absent.bin"), root.path()));
    }
}
