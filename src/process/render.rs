use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    cli::RenderProcess,
    config::Config,
    process::{Process, ProcessOutput},
    service::SyncService,
    utils::render_description,
    xml::INDENT,
};

impl Process for RenderProcess {
    #[instrument(skip_all)]
    async fn execute(
        self,
        _config: Config,
        _service: SyncService,
        _cancellation_token: CancellationToken,
    ) -> color_eyre::Result<ProcessOutput> {
        let markdown = self.input.contents()?;
        let mut description = render_description(&markdown);
        description.indent(INDENT);
        Ok(ProcessOutput::success().stdout(description.to_fragment_string()?))
    }
}
