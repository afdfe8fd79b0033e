//! # CLI Argument Definitions

use crate::healthcheck::DEFAULT_URL;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lvai-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LotteryVision API server")]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Default, Subcommand)]
pub enum Command {
    /// Run the HTTP API (configuration from `server.toml`, `LVAI_CONFIG` and `LVAI__*`)
    #[default]
    Serve,
    /// Probe a running server once; exit 0 when healthy, 1 otherwise
    Healthcheck(HealthcheckArgs),
}

#[derive(Debug, Args)]
pub struct HealthcheckArgs {
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,
    /// Seconds to wait for the response
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["lvai-server"]).unwrap();
        assert!(matches!(cli.command.unwrap_or_default(), Command::Serve));
    }

    #[test]
    fn healthcheck_defaults_follow_the_probe_policy() {
        let cli = Cli::try_parse_from(["lvai-server", "healthcheck"]).unwrap();
        let Some(Command::Healthcheck(args)) = cli.command else { panic!("expected healthcheck") };
        assert_eq!(args.url, "http://localhost:8000/health");
        assert_eq!(args.timeout, 10);

        let cli = Cli::try_parse_from([
            "lvai-server",
            "healthcheck",
            "--url",
            "http://127.0.0.1:9000/health",
            "--timeout",
            "3",
        ])
        .unwrap();
        let Some(Command::Healthcheck(args)) = cli.command else { panic!("expected healthcheck") };
        assert_eq!((args.url.as_str(), args.timeout), ("http://127.0.0.1:9000/health", 3));
    }
}
