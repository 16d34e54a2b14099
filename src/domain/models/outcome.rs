use http::StatusCode;

/// Success marker returned by mutating operations, paired with its status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub status: StatusCode,
    pub message: &'static str,
}

impl Outcome {
    pub const fn created() -> Self {
        Self {
            status: StatusCode::CREATED,
            message: "Created",
        }
    }

    pub const fn downloaded() -> Self {
        Self {
            status: StatusCode::OK,
            message: "Downloaded",
        }
    }

    pub const fn deleted() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            message: "Deleted",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}
