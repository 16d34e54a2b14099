/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // BucketName validation errors
    BucketNameTooShort {
        actual: usize,
        min: usize,
    },
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameComponentTooLong {
        component: String,
        max: usize,
    },
    BucketNameInvalidStart,
    BucketNameInvalidEnd,
    BucketNameInvalidCharacter(char),
    BucketNameLooksLikeIpAddress,
    BucketNameReservedWord(&'static str),

    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectKeyCharacter(char),
    ObjectKeyStartsWithSlash,
    ObjectKeyEndsWithSlash,
    ObjectKeyContainsDoubleSlash,
    ObjectKeyReserved(String),
    ObjectKeyEscapesDirectory(String),

    // Location validation errors
    EmptyLocation,
    LocationTooLong {
        actual: usize,
        max: usize,
    },
    InvalidLocationCharacter(char),

    // Argument refused by the backend itself
    RejectedByBackend(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // BucketName errors
            ValidationError::BucketNameTooShort { actual, min } => {
                write!(
                    f,
                    "Bucket name too short: {} characters (min: {})",
                    actual, min
                )
            }
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::BucketNameComponentTooLong { component, max } => {
                write!(
                    f,
                    "Bucket name component '{}' too long (max: {} characters)",
                    component, max
                )
            }
            ValidationError::BucketNameInvalidStart => {
                write!(f, "Bucket name must start with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidEnd => {
                write!(f, "Bucket name must end with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in bucket name: '{}'. Only lowercase letters, numbers, hyphens, underscores and dots allowed",
                    c
                )
            }
            ValidationError::BucketNameLooksLikeIpAddress => {
                write!(f, "Bucket name cannot be formatted as an IP address")
            }
            ValidationError::BucketNameReservedWord(word) => {
                write!(f, "Bucket name cannot contain reserved word '{}'", word)
            }

            // ObjectKey errors
            ValidationError::EmptyObjectKey => write!(f, "Object name cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object name too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectKeyCharacter(c) => {
                write!(f, "Invalid character in object name: {:?}", c)
            }
            ValidationError::ObjectKeyStartsWithSlash => {
                write!(f, "Object name cannot start with '/'")
            }
            ValidationError::ObjectKeyEndsWithSlash => {
                write!(f, "Object name cannot end with '/'")
            }
            ValidationError::ObjectKeyContainsDoubleSlash => {
                write!(f, "Object name cannot contain '//'")
            }
            ValidationError::ObjectKeyReserved(name) => {
                write!(f, "Object name '{}' is reserved", name)
            }
            ValidationError::ObjectKeyEscapesDirectory(name) => {
                write!(
                    f,
                    "Object name '{}' cannot be mapped to a path inside the download directory",
                    name
                )
            }

            // Location errors
            ValidationError::EmptyLocation => write!(f, "Location cannot be empty"),
            ValidationError::LocationTooLong { actual, max } => {
                write!(
                    f,
                    "Location too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::InvalidLocationCharacter(c) => {
                write!(f, "Invalid character in location: '{}'", c)
            }

            ValidationError::RejectedByBackend(message) => {
                write!(f, "Rejected by backend: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
