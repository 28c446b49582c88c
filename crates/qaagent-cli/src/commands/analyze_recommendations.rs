//! `analyze recommendations`: map coverage onto journeys and derive
//! prioritized recommendations from a run's persisted risks.

use crate::cli::args::RecommendationsArgs;
use qaagent_analysis::{journey, recommend, JourneyConfig};
use qaagent_common::error::Result;
use qaagent_evidence::{runs_root, IdGenerator, Reader, RunHandle, SharedIdGenerator, Writer};

pub async fn run(args: RecommendationsArgs) -> Result<i32> {
    let runs_root = runs_root::resolve(args.runs_dir.as_deref());
    let run = match &args.run_id {
        Some(id) => RunHandle::load(&runs_root, id)?,
        None => RunHandle::load_latest(&runs_root)?,
    };

    let journey_config = match &args.journey_config {
        Some(path) => JourneyConfig::load(path)?,
        None => JourneyConfig::load(std::path::Path::new("journeys.yaml"))?,
    };

    let reader = Reader::new(&run);
    let journeys = journey::map_journeys(&journey_config, &reader.coverage())?;

    let ids = SharedIdGenerator::new(IdGenerator::from_run_id(&run.run_id())?);
    let recommendations = recommend::recommend(&reader.risks(), &journeys, &ids)?;

    let n = Writer::new(&run).write(qaagent_evidence::model::RecordType::Recommendations, &recommendations)?;
    println!("run {}: wrote {n} recommendations", run.run_id());
    Ok(crate::exit_codes::EXIT_SUCCESS)
}
