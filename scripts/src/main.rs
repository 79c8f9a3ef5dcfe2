use clap::Parser;
use scripts::{cli::Cli, utils::AbortSignal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let Cli { opts, command } = Cli::parse();

    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(opts.log_level)
        .init();

    // The in-flight call settles before the run stops
    let abort = AbortSignal::default();
    let signal = abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("abort requested, stopping after the in-flight call");
            signal.abort();
        }
    });

    let report = command.run(&opts, abort).await?;
    info!("{report}");
    Ok(())
}
