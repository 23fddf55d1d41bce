use std::fmt;

/// Errors that can occur at the crate's integration boundaries.
///
/// The decision core itself is total and never fails; errors exist
/// only where external input enters the system (configuration
/// validation) or where external collaborators are consulted
/// (alias/role providers).
#[derive(Debug)]
pub enum Error {
    /// Configuration failed validation
    Config(ConfigViolation),
    /// An external collaborator failed
    Provider(ProviderError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(v) => write!(f, "Configuration violation: {}", v),
            Error::Provider(e) => write!(f, "Provider failure: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigViolation> for Error {
    fn from(v: ConfigViolation) -> Self {
        Error::Config(v)
    }
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        Error::Provider(e)
    }
}

/// A configuration validation failure with details about what failed.
#[derive(Debug)]
pub struct ConfigViolation {
    /// The kind of violation that occurred
    pub kind: ConfigViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl ConfigViolation {
    /// Creates a new configuration violation.
    pub fn new(kind: ConfigViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigViolation {}

/// The kind of configuration violation.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigViolationKind {
    /// A base URL is not an absolute http(s) origin
    InvalidBaseUrl {
        /// The configuration field that failed validation
        field: &'static str,
    },
    /// A base URL carries the wrong scheme for its field
    SchemeMismatch {
        /// The configuration field that failed validation
        field: &'static str,
    },
}

impl fmt::Display for ConfigViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigViolationKind::InvalidBaseUrl { field } => {
                write!(f, "Invalid base URL in '{}'", field)
            }
            ConfigViolationKind::SchemeMismatch { field } => {
                write!(f, "Scheme mismatch in '{}'", field)
            }
        }
    }
}

/// Failure reported by an external collaborator (alias resolution,
/// role lookup).
///
/// Providers are outside the trust boundary of the decision core: the
/// web adapter absorbs these errors into safe defaults and logs them,
/// so request handling never aborts on a provider failure.
#[derive(Debug)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    /// Creates a provider error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}
