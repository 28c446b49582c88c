//! `api`: serve the read-only HTTP API until interrupted.

use crate::cli::args::ApiArgs;
use qaagent_common::error::{Error, Result};

pub async fn run(args: ApiArgs) -> Result<i32> {
    let runs_root = args.runs_dir.map(std::path::PathBuf::from);
    qaagent_api::serve(&args.host, args.port, runs_root)
        .await
        .map_err(|e| Error::io(e.to_string()))?;
    Ok(crate::exit_codes::EXIT_SUCCESS)
}
