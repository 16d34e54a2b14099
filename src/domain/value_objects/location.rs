use crate::domain::errors::ValidationError;

const MAX_LEN: usize = 63;

/// Location a bucket is created in, stored upper case as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub const DEFAULT: &'static str = "EU";

    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyLocation);
        }

        if value.len() > MAX_LEN {
            return Err(ValidationError::LocationTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
        {
            return Err(ValidationError::InvalidLocationCharacter(c));
        }

        Ok(Self(value.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Location {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Location {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_normalised() {
        assert_eq!(Location::new("eu".to_string()).unwrap().as_str(), "EU");
        assert_eq!(
            Location::new("europe-west1".to_string()).unwrap().as_str(),
            "EUROPE-WEST1"
        );
        assert_eq!(Location::default().as_str(), "EU");
    }

    #[test]
    fn test_invalid_location() {
        assert_eq!(
            Location::new(String::new()),
            Err(ValidationError::EmptyLocation)
        );
        assert_eq!(
            Location::new("us east".to_string()),
            Err(ValidationError::InvalidLocationCharacter(' '))
        );
        assert!(Location::new("x".repeat(64)).is_err());
    }
}
