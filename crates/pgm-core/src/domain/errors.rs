use std::fmt::{Display, Formatter};

pub type PgmResult<T> = Result<T, PgmError>;

/// Failure class; each maps to one process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PgmErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl PgmErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

impl Display for PgmErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single failure signal of the engine.
///
/// `placeholder` is a stable dotted code (`INPUT.EMPTY_TRACE`,
/// `RUN.NON_FINITE`, ...) that callers can match on without parsing the
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{category} [{placeholder}] {message}")]
pub struct PgmError {
    category: PgmErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl PgmError {
    pub fn new(
        category: PgmErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            PgmErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    /// Used by front ends for filesystem failures around the engine.
    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PgmErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PgmErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(PgmErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> PgmErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// One stderr line: `ERROR: [PLACEHOLDER] message`.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }
}
