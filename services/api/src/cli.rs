use crate::commands::{run_assess, run_forecast, AssessArgs, ForecastArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use isf_assess::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "ISF School Assessment",
    about = "Score prospective school acquisitions and forecast commissioning demand",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a Go/No-Go assessment for one school
    Assess(AssessArgs),
    /// Project fill rates for candidate facility sizes
    Forecast(ForecastArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args).await,
        Command::Forecast(args) => run_forecast(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isf_assess::workflows::assessment::{Criterion, Score};

    #[test]
    fn assess_collects_repeated_overrides() {
        let cli = Cli::try_parse_from([
            "isf-assess-api",
            "assess",
            "100001",
            "--today",
            "2026-06-01",
            "--override",
            "synergy=4",
            "--override",
            "reputation=tbc",
        ])
        .expect("arguments parse");

        let Some(Command::Assess(args)) = cli.command else {
            panic!("expected assess command");
        };
        assert_eq!(args.urn, "100001");
        assert_eq!(args.overrides.len(), 2);
        assert_eq!(args.overrides[1], (Criterion::Reputation, Score::NotComputable));
    }

    #[test]
    fn assess_rejects_bad_override() {
        let parsed = Cli::try_parse_from(["isf-assess-api", "assess", "100001", "--override", "synergy=7"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn forecast_accepts_multiple_capacities() {
        let cli = Cli::try_parse_from([
            "isf-assess-api",
            "forecast",
            "--unplaced",
            "500",
            "--capacity",
            "12",
            "--capacity",
            "30",
        ])
        .expect("arguments parse");

        let Some(Command::Forecast(args)) = cli.command else {
            panic!("expected forecast command");
        };
        assert_eq!(args.unplaced, Some(500));
        assert_eq!(args.capacities, vec![12, 30]);
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["isf-assess-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
