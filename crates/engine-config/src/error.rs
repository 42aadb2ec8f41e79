use thiserror::Error;

/// Errors raised while resolving process configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A required environment variable was absent or empty.
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    /// A variable was present but unusable.
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    /// The optional .env file could not be read or parsed.
    #[error("Env file error: {0}")]
    EnvFile(String),
}
