use std::process::ExitCode;

use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use http_redirect::cli::Cli;
use http_redirect::error::SetupError;
use http_redirect::redirect::Redirector;
use http_redirect::server::{Server, listener};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let default_filter = if cli.quiet {
        "http_redirect=warn"
    } else {
        "http_redirect=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let code = e
                .downcast_ref::<SetupError>()
                .map_or(1, SetupError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = cli.into_config()?;
    let redirector = Redirector::from_config(&cfg)?;
    for rule in redirector.rules() {
        tracing::debug!(
            pattern = rule.pattern(),
            destination = rule.destination().location(),
            "Rule loaded"
        );
    }
    let listener = listener::bind(cfg.bind.as_deref(), &cfg.port).await?;

    let server = Server::with_config(listener, redirector, &cfg);
    tracing::info!(
        mode = ?server.mode(),
        bind = cfg.display_bind(),
        rules = cfg.rules.len(),
        default = %cfg.default_destination,
        max_connections = cfg.max_connections,
        "Redirect server ready"
    );

    tokio::select! {
        _ = server.run() => {}

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
