use crate::domain::ConfigError;

/// CLI-level error: a message plus the process exit code it maps to.
///
/// Exit codes:
/// - `2`: usage or input file problems
/// - `3`: no usable data (unknown product/store/category, empty dataset)
/// - `4`: internal failures and output write errors
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(2, err.to_string())
    }
}
