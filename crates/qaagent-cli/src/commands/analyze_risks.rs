//! `analyze risks`: load a run's findings/coverage/churn, aggregate
//! per-component risk, and persist the result to `risks.jsonl`.

use crate::cli::args::RunSelectorArgs;
use qaagent_analysis::{risk, RiskConfig};
use qaagent_common::error::Result;
use qaagent_evidence::{runs_root, IdGenerator, Reader, RunHandle, SharedIdGenerator, Writer};

pub async fn run(args: RunSelectorArgs) -> Result<i32> {
    let runs_root = runs_root::resolve(args.runs_dir.as_deref());
    let run = match &args.run_id {
        Some(id) => RunHandle::load(&runs_root, id)?,
        None => RunHandle::load_latest(&runs_root)?,
    };

    let config = match &args.risk_config {
        Some(path) => RiskConfig::load(path)?,
        None => RiskConfig::load(std::path::Path::new("risk.yaml"))?,
    };

    let reader = Reader::new(&run);
    let ids = SharedIdGenerator::new(IdGenerator::from_run_id(&run.run_id())?);
    let risks = risk::aggregate(&reader.findings(), &reader.coverage(), &reader.churn(), &config, &ids)?;

    let n = Writer::new(&run).write(qaagent_evidence::model::RecordType::Risks, &risks)?;
    println!("run {}: wrote {n} risk records", run.run_id());
    Ok(crate::exit_codes::EXIT_SUCCESS)
}
