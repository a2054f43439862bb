use std::process::ExitCode;

use clap::Parser;
use metainfo_sync::{app::App, cli::Cli, config::Config, errors, logging, service::SyncService};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse the arguments
    let cli = Cli::parse();

    // Initialize the configuration
    let config = match Config::init(cli.config.clone()) {
        Ok(config) => config,
        Err(report) => {
            eprintln!("{report:?}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging and error handling
    let (logs_path, filter) = logging::resolve_path_and_filter(&config);
    let logs_enabled = filter.is_some();
    if let Err(report) =
        logging::init(logs_path.clone(), filter).and_then(|_| errors::init(logs_enabled.then_some(logs_path)))
    {
        eprintln!("{report:?}");
        return ExitCode::FAILURE;
    }

    // Cancel the run when ctrl-c is received
    let cancellation_token = CancellationToken::new();
    let token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received ctrl-c, cancelling the run");
            token.cancel();
        }
    });

    // Run the requested process
    let service = SyncService::new(config.repository.clone(), config.limit);
    let output = match App::new(cancellation_token).run(config, service, cli.process).await {
        Ok(output) => output,
        Err(report) => {
            tracing::error!("Error: {report:?}");
            eprintln!("{report:?}");
            return ExitCode::FAILURE;
        }
    };

    // Print any content received
    if let Some(stderr) = output.stderr {
        eprintln!("{stderr}");
    }
    if let Some(stdout) = output.stdout {
        // Serialized documents already carry their trailing newline
        if stdout.ends_with('\n') {
            print!("{stdout}");
        } else {
            println!("{stdout}");
        }
    }

    if output.failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
