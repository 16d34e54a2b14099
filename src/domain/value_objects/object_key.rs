use std::path::{Component, Path, PathBuf};

use crate::domain::errors::ValidationError;

const MAX_LEN: usize = 1024;
const ACME_PREFIX: &str = ".well-known/acme-challenge/";

/// A validated object name within a bucket
///
/// Names are '/'-separated paths without empty, `.` or `..` segments, so every
/// key maps one-to-one onto an object store path and onto a relative local path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        if let Some(c) = value.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
            return Err(ValidationError::InvalidObjectKeyCharacter(c));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.ends_with('/') {
            return Err(ValidationError::ObjectKeyEndsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectKeyContainsDoubleSlash);
        }

        if value.split('/').any(|segment| segment == "." || segment == "..")
            || value.starts_with(ACME_PREFIX)
        {
            return Err(ValidationError::ObjectKeyReserved(value));
        }

        Ok(Self(value))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map this key to a path below `directory`, one path segment per '/'
    pub fn local_path_in(&self, directory: &Path) -> Result<PathBuf, ValidationError> {
        let relative = Path::new(&self.0);

        // Platform prefixes such as `C:` are not plain segments
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(ValidationError::ObjectKeyEscapesDirectory(self.0.clone()));
        }

        Ok(directory.join(relative))
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ObjectKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_key() {
        assert!(ObjectKey::new("a.txt".to_string()).is_ok());
        assert!(ObjectKey::new("folder/file.txt".to_string()).is_ok());
        assert!(ObjectKey::new(".hidden/config".to_string()).is_ok());
        assert!(ObjectKey::new("x".repeat(1024)).is_ok());
    }

    #[test]
    fn test_invalid_object_key() {
        assert_eq!(
            ObjectKey::new("".to_string()),
            Err(ValidationError::EmptyObjectKey)
        );
        assert!(ObjectKey::new("x".repeat(1025)).is_err());
        assert_eq!(
            ObjectKey::new("line\nbreak".to_string()),
            Err(ValidationError::InvalidObjectKeyCharacter('\n'))
        );
        assert_eq!(
            ObjectKey::new("nul\0byte".to_string()),
            Err(ValidationError::InvalidObjectKeyCharacter('\0'))
        );
        assert_eq!(
            ObjectKey::new("/leading-slash".to_string()),
            Err(ValidationError::ObjectKeyStartsWithSlash)
        );
        assert_eq!(
            ObjectKey::new("dir/".to_string()),
            Err(ValidationError::ObjectKeyEndsWithSlash)
        );
        assert_eq!(
            ObjectKey::new("double//slash".to_string()),
            Err(ValidationError::ObjectKeyContainsDoubleSlash)
        );
        assert!(ObjectKey::new("..".to_string()).is_err());
        assert!(ObjectKey::new("../etc/passwd".to_string()).is_err());
        assert!(ObjectKey::new("a/./b".to_string()).is_err());
        assert!(ObjectKey::new(".well-known/acme-challenge/token".to_string()).is_err());
    }

    #[test]
    fn test_local_path_in() {
        let dir = Path::new("/downloads");

        let key = ObjectKey::new("reports/2024/q1.csv".to_string()).unwrap();
        assert_eq!(
            key.local_path_in(dir).unwrap(),
            PathBuf::from("/downloads/reports/2024/q1.csv")
        );

        let key = ObjectKey::new("a.txt".to_string()).unwrap();
        assert_eq!(
            key.local_path_in(dir).unwrap(),
            PathBuf::from("/downloads/a.txt")
        );
    }
}
