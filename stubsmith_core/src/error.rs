use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StubsmithError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("Module not found: {module}")]
    ModuleNotFound { module: String },

    #[error("Invalid introspection dump: {0}")]
    InvalidDump(String),

    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Python error: {0}")]
    Python(String),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for StubsmithError {
    fn from(err: pyo3::PyErr) -> Self {
        StubsmithError::Python(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StubsmithError>;

impl StubsmithError {
    pub fn config(message: impl Into<String>) -> Self {
        StubsmithError::Config(message.into())
    }

    pub fn invalid_dump(message: impl Into<String>) -> Self {
        StubsmithError::InvalidDump(message.into())
    }

    pub fn introspection(message: impl Into<String>) -> Self {
        StubsmithError::Introspection(message.into())
    }

    pub fn module_not_found(module: impl Into<String>) -> Self {
        StubsmithError::ModuleNotFound {
            module: module.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert_eq!(
            StubsmithError::config("missing [stubgen]").to_string(),
            "Configuration error: missing [stubgen]"
        );
        assert_eq!(
            StubsmithError::module_not_found("mitsuba").to_string(),
            "Module not found: mitsuba"
        );
        assert_eq!(
            StubsmithError::invalid_dump("member 'x' points at object 9").to_string(),
            "Invalid introspection dump: member 'x' points at object 9"
        );
    }

    #[test]
    fn test_config_errors_convert_with_question_mark() {
        fn parse(text: &str) -> Result<toml::Table> {
            Ok(toml::from_str(text)?)
        }
        assert!(matches!(parse("not = [valid"), Err(StubsmithError::Toml(_))));
        assert_eq!(
            StubsmithError::EnvVarNotSet("STUBSMITH_DUMP".into()).to_string(),
            "Environment variable not set: STUBSMITH_DUMP"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StubsmithError = io.into();
        assert!(matches!(err, StubsmithError::Io(_)));
    }
}
