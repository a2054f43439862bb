use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    cli::SyncProcess,
    config::Config,
    errors::AppError,
    format_error, format_msg,
    process::{Process, ProcessOutput},
    service::SyncService,
};

impl Process for SyncProcess {
    #[instrument(skip_all)]
    async fn execute(
        self,
        config: Config,
        service: SyncService,
        cancellation_token: CancellationToken,
    ) -> color_eyre::Result<ProcessOutput> {
        let path = config.metainfo_path(self.file)?;
        let service = service.with_repository(self.repo).with_limit(self.limit);
        tracing::info!("Syncing releases of {} into {}", service.repository(), path.display());

        match service.sync(&path, self.dry_run, &cancellation_token).await {
            Ok(report) if self.dry_run => Ok(ProcessOutput::success().stdout(report.document)),
            Ok(report) => Ok(ProcessOutput::success().stderr(format_msg!(
                "Synchronized {} releases into '{}' ({} replaced, {} new)",
                report.replaced.len() + report.inserted.len(),
                path.display(),
                report.replaced.len(),
                report.inserted.len()
            ))),
            Err(AppError::UserFacing(err)) => Ok(ProcessOutput::fail().stderr(format_error!("{err}"))),
            Err(AppError::Unexpected(report)) => Err(report),
        }
    }
}
