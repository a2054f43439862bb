mod render;
mod sync;

use tokio_util::sync::CancellationToken;

use crate::{config::Config, service::SyncService};

/// Output of an executed process
#[derive(Default)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct ProcessOutput {
    /// Whether the process failed and the program must exit with a non-zero code
    pub failed: bool,
    /// Content to be written to stdout
    pub stdout: Option<String>,
    /// Content to be written to stderr
    pub stderr: Option<String>,
}

impl ProcessOutput {
    /// An output with a zero exit code
    pub fn success() -> Self {
        Self::default()
    }

    /// An output with a non-zero exit code
    pub fn fail() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }

    /// Includes content to be written to stdout
    pub fn stdout(mut self, content: impl Into<String>) -> Self {
        self.stdout = Some(content.into());
        self
    }

    /// Includes content to be written to stderr
    pub fn stderr(mut self, content: impl Into<String>) -> Self {
        self.stderr = Some(content.into());
        self
    }
}

/// Trait for the processes this tool can run
#[allow(async_fn_in_trait)]
pub trait Process {
    /// Executes the process, returning its final output
    async fn execute(
        self,
        config: Config,
        service: SyncService,
        cancellation_token: CancellationToken,
    ) -> color_eyre::Result<ProcessOutput>;
}
