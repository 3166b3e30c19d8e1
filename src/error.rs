//! Error types for Taskweave

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Taskweave operations
pub type Result<T> = std::result::Result<T, TaskweaveError>;

/// Main error type for Taskweave
#[derive(Error, Debug)]
pub enum TaskweaveError {
    /// Manifest-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while rendering a task into a shell command
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Manifest parsing, validation and registry errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find manifest file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Step {index} of task '{task}' is invalid: {reason}")]
    InvalidStep {
        task: String,
        index: usize,
        reason: String,
    },

    #[error("Task '{0}' is already defined")]
    DuplicateTask(String),

    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Failed to load env file '{path}': {error}")]
    EnvFile { path: PathBuf, error: String },
}

/// Rendering errors. All are build-configuration bugs, never runtime conditions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unable to resolve task '{0}'")]
    UnknownTask(String),

    #[error("Circular task reference: {0}")]
    CircularReference(String),

    #[error("Invalid environment variable name '{0}'")]
    InvalidEnvName(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for render operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;
