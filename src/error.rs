use std::path::Path;

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

    /// A model/schema artifact could not be located or read.
    ///
    /// This is fatal for the whole run: nothing downstream can operate
    /// without the trained model and its column list.
    pub fn artifact_missing(path: &Path, err: &std::io::Error) -> Self {
        Self::new(
            2,
            format!("Artifact not found or unreadable '{}': {err}", path.display()),
        )
    }

    /// A feature vector did not match the training schema length.
    ///
    /// Inputs are aligned to the schema before scoring, so hitting this is a
    /// programming error, not a user error.
    pub fn shape_mismatch(context: &str, expected: usize, got: usize) -> Self {
        Self::new(
            4,
            format!(
                "Feature vector shape mismatch in {context}: expected {expected} values, got {got}."
            ),
        )
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
