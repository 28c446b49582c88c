use super::{analyze_collectors, analyze_recommendations, analyze_risks, api, list_runs};
use crate::cli::args::{AnalyzeSub, Cli, Command};
use qaagent_common::error::Result;

pub async fn dispatch(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::Analyze(args) => match args.cmd {
            AnalyzeSub::Collectors(args) => analyze_collectors::run(args).await,
            AnalyzeSub::Risks(args) => analyze_risks::run(args).await,
            AnalyzeSub::Recommendations(args) => analyze_recommendations::run(args).await,
            AnalyzeSub::ListRuns(args) => list_runs::run(args).await,
        },
        Command::Api(args) => api::run(args).await,
    }
}
