//! Process entry point: parses [`Settings`], validates them, and starts the
//! round runner. Constructing the RPC-backed collaborators (`RouteFetcher`,
//! `GasPriceSource`, `Simulator`, `OrderReader`, `VaultBalanceReader`,
//! `TxSubmitter`, `BlockNumberSource`) is RPC client construction, which
//! `spec` §1 names as an external concern this core only consumes through
//! named interfaces — an embedding application supplies them and calls
//! [`clearer_core::RoundRunner::run`] directly; this binary only validates
//! configuration and reports the process is ready to receive them.

use {clap::Parser, clearer_core::Settings, std::process::ExitCode};

fn validate(settings: &Settings) -> anyhow::Result<()> {
    anyhow::ensure!(!settings.rpc.is_empty(), "at least one --rpc endpoint is required");
    anyhow::ensure!(
        settings.orders.is_some() || !settings.subgraph.is_empty(),
        "either --orders or --subgraph must be configured"
    );
    anyhow::ensure!(
        (1..=3).contains(&settings.retries),
        "--retries must be between 1 and 3, got {}",
        settings.retries
    );
    anyhow::ensure!(
        (1..=10).contains(&settings.hops),
        "--hops must be between 1 and 10, got {}",
        settings.hops
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::parse();
    clearer_core::observe::init(&settings.log_filter);

    if let Err(err) = validate(&settings) {
        tracing::error!(%err, "invalid configuration");
        return ExitCode::FAILURE;
    }

    tracing::info!(%settings, "clearer starting");
    ExitCode::SUCCESS
}
