use std::{fmt, path::PathBuf};

use color_eyre::{Report, config::HookBuilder};

/// Result type for operations that can produce an [AppError]
pub type Result<T> = std::result::Result<T, AppError>;

/// Initializes error and panic report handling
pub fn init(log_path: Option<PathBuf>) -> color_eyre::Result<()> {
    tracing::trace!("Initializing error handlers");
    let panic_section = if let Some(log_path) = log_path {
        format!(
            "This is a bug. Consider reporting it at {}\nLogs can be found at {}",
            env!("CARGO_PKG_REPOSITORY"),
            log_path.display()
        )
    } else {
        format!(
            "This is a bug. Consider reporting it at {}\nLogs were not generated, consider enabling them on the \
             config or running with METAINFO_SYNC_LOG=debug.",
            env!("CARGO_PKG_REPOSITORY")
        )
    };
    HookBuilder::default()
        .panic_section(panic_section)
        .display_env_section(false)
        .display_location_section(true)
        .capture_span_trace_by_default(true)
        .install()
}

/// Error type for application operations
#[derive(Debug)]
pub enum AppError {
    /// An expected error caused by the environment or the input, displayed as a plain message
    UserFacing(UserFacingError),
    /// An unexpected error occurred
    Unexpected(Report),
}

impl AppError {
    pub fn into_report(self) -> Report {
        match self {
            AppError::UserFacing(err) => Report::msg(err.to_string()),
            AppError::Unexpected(report) => report,
        }
    }
}

/// Errors expected as part of the regular operation of the tool
#[derive(Debug)]
pub enum UserFacingError {
    /// The operation was cancelled
    Cancelled,
    /// The `gh` executable couldn't be found
    GhNotFound,
    /// A `gh` invocation exited with a failure
    GhFailed(String),
    /// The metainfo releases document could not be found at the given path
    MetainfoNotFound(PathBuf),
    /// The metainfo releases document is not well-formed
    MetainfoInvalid(String, String),
}

impl fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserFacingError::Cancelled => write!(f, "Operation was cancelled"),
            UserFacingError::GhNotFound => write!(
                f,
                "Couldn't find the `gh` executable, make sure the GitHub CLI is installed and available on the PATH"
            ),
            UserFacingError::GhFailed(stderr) if stderr.is_empty() => write!(f, "The `gh` invocation failed"),
            UserFacingError::GhFailed(stderr) => write!(f, "The `gh` invocation failed: {stderr}"),
            UserFacingError::MetainfoNotFound(path) => {
                write!(f, "Couldn't find the metainfo releases document at '{}'", path.display())
            }
            UserFacingError::MetainfoInvalid(path, reason) => {
                write!(f, "The metainfo releases document at '{path}' is not valid: {reason}")
            }
        }
    }
}

impl From<UserFacingError> for AppError {
    fn from(err: UserFacingError) -> Self {
        AppError::UserFacing(err)
    }
}

macro_rules! impl_from_report {
    ($err:ty) => {
        impl<T> From<T> for $err
        where
            T: Into<Report>,
        {
            fn from(err: T) -> Self {
                Self::Unexpected(err.into())
            }
        }
    };
}
impl_from_report!(AppError);
