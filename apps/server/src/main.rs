use anyhow::Context;
use clap::Parser;
use lvai::kernel::config::load_api_config;
use lvai_logger::Logger;
use lvai_runtime::{RuntimeConfig, build_runtime_with_config};
use lvai_server::Server;
use lvai_server::cli::{Cli, Command, HealthcheckArgs};
use lvai_server::healthcheck::{ProbeOutcome, probe_once};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> anyhow::Result<ExitCode> {
    match Cli::parse().command.unwrap_or_default() {
        Command::Serve => serve().map(|()| ExitCode::SUCCESS),
        Command::Healthcheck(args) => healthcheck(&args),
    }
}

#[lvai_runtime::main(server)]
async fn serve() -> anyhow::Result<()> {
    let cfg = load_api_config(None::<&str>).context("Critical: Configuration is malformed")?;

    let logger = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .env_filter(cfg.log.level.clone())
        .json(cfg.log.json);
    let _log = match cfg.log.path.clone() {
        Some(path) => logger.path(path).init()?,
        None => logger.init()?,
    };

    Server::builder().config(cfg).build().await?.run().await
}

#[allow(clippy::print_stderr)]
fn healthcheck(args: &HealthcheckArgs) -> anyhow::Result<ExitCode> {
    let runtime = build_runtime_with_config(&RuntimeConfig::probe())?;
    let outcome = runtime.block_on(probe_once(&args.url, Duration::from_secs(args.timeout)));

    Ok(match outcome {
        ProbeOutcome::Healthy => ExitCode::SUCCESS,
        ProbeOutcome::Unhealthy(reason) => {
            eprintln!("unhealthy: {reason}");
            ExitCode::FAILURE
        },
    })
}
