use crate::domain::errors::ValidationError;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;
const MAX_DOTTED_LEN: usize = 222;

/// A validated bucket name following Cloud Storage naming rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName, rejecting names the backend would refuse
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let max = if value.contains('.') {
            MAX_DOTTED_LEN
        } else {
            MAX_LEN
        };

        if value.len() < MIN_LEN {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_LEN,
            });
        }

        if value.len() > max {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max,
            });
        }

        // Must start and end with lowercase letter or number
        if !value
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidStart);
        }

        if !value
            .chars()
            .last()
            .map_or(false, |c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && !matches!(c, '-' | '_' | '.') {
                return Err(ValidationError::BucketNameInvalidCharacter(c));
            }
        }

        if let Some(component) = value.split('.').find(|part| part.len() > MAX_LEN) {
            return Err(ValidationError::BucketNameComponentTooLong {
                component: component.to_string(),
                max: MAX_LEN,
            });
        }

        if Self::looks_like_ip_address(&value) {
            return Err(ValidationError::BucketNameLooksLikeIpAddress);
        }

        if value.starts_with("goog") {
            return Err(ValidationError::BucketNameReservedWord("goog"));
        }

        if value.contains("google") {
            return Err(ValidationError::BucketNameReservedWord("google"));
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn looks_like_ip_address(s: &str) -> bool {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return false;
        }

        parts.iter().all(|part| part.parse::<u8>().is_ok())
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BucketName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}
