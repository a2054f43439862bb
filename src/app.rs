use color_eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    cli::CliProcess,
    config::Config,
    process::{Process, ProcessOutput},
    service::SyncService,
};

/// The main application struct, dispatching the parsed CLI command
pub struct App {
    cancellation_token: CancellationToken,
}

impl App {
    /// Creates a new instance of the application
    pub fn new(cancellation_token: CancellationToken) -> Self {
        Self { cancellation_token }
    }

    /// Runs the main application logic based on the parsed CLI arguments.
    ///
    /// It returns the final [ProcessOutput] when the application finishes.
    #[instrument(skip_all)]
    pub async fn run(self, config: Config, service: SyncService, process: CliProcess) -> Result<ProcessOutput> {
        match process {
            CliProcess::Sync(sync) => {
                tracing::info!("Running 'sync' process");
                tracing::debug!("Options: {:?}", sync);
                sync.execute(config, service, self.cancellation_token).await
            }
            CliProcess::Render(render) => {
                tracing::info!("Running 'render' process");
                tracing::debug!("Options: {:?}", render);
                render.execute(config, service, self.cancellation_token).await
            }
        }
    }
}
