use crate::commands::{run_demo, run_extract, run_indicators, run_score};
use crate::server;
use clap::{Args, Parser, Subcommand};
use proposal_scoring::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Proposal Scoring",
    about = "Extract, compare and rank competition proposals from the command line",
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
    /// Extract indicator values from a plain-text proposal document
    Extract(ExtractArgs),
    /// Score proposals listed in a Proposal,Indicator,Value sheet
    Score(ScoreArgs),
    /// List the indicators of the active registry
    Indicators,
    /// Compare the bundled sample proposals end to end
    Demo(DemoArgs),
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

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// Plain-text document produced by the upstream OCR step
    #[arg(long)]
    pub(crate) document: PathBuf,
    /// Proposal identifier (defaults to the file stem)
    #[arg(long)]
    pub(crate) proposal_id: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ScoringArgs {
    /// Restrict scoring to these indicator ids (repeatable, defaults to all)
    #[arg(long = "indicator")]
    pub(crate) indicators: Vec<String>,
    /// JSON weight configuration file
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
    /// Indicator weight override as ID=PERCENT (repeatable)
    #[arg(long = "indicator-weight", value_parser = crate::infra::parse_weight)]
    pub(crate) indicator_weights: Vec<(String, f64)>,
    /// Category weight override as CATEGORY=PERCENT (repeatable)
    #[arg(long = "category-weight", value_parser = crate::infra::parse_weight)]
    pub(crate) category_weights: Vec<(String, f64)>,
    /// Print JSON instead of tables
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV sheet with Proposal, Indicator and Value columns
    #[arg(long)]
    pub(crate) sheet: PathBuf,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Extract(args) => run_extract(args),
        Command::Score(args) => run_score(args),
        Command::Indicators => run_indicators(),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["proposal-scoring-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_accepts_repeated_overrides() {
        let cli = Cli::try_parse_from([
            "proposal-scoring-api",
            "score",
            "--sheet",
            "proposals.csv",
            "--indicator",
            "built_area",
            "--indicator",
            "green_area",
            "--indicator-weight",
            "built_area=60",
            "--category-weight",
            "land_use=50",
        ])
        .expect("parses");

        let Some(Command::Score(args)) = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(args.sheet, PathBuf::from("proposals.csv"));
        assert_eq!(args.scoring.indicators, vec!["built_area", "green_area"]);
        assert_eq!(
            args.scoring.indicator_weights,
            vec![("built_area".to_string(), 60.0)]
        );
        assert_eq!(
            args.scoring.category_weights,
            vec![("land_use".to_string(), 50.0)]
        );
    }

    #[test]
    fn malformed_weight_is_rejected() {
        let result = Cli::try_parse_from([
            "proposal-scoring-api",
            "demo",
            "--indicator-weight",
            "built_area",
        ]);
        assert!(result.is_err());
    }
}
