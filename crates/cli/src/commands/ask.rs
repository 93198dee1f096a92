use std::path::PathBuf;

use anyhow::Result;

use super::{build_orchestrator, init_logging, load_config};

pub async fn run(config_path: Option<PathBuf>, question: &str) -> Result<()> {
    let config = load_config(config_path)?;
    init_logging(&config);

    let orchestrator = build_orchestrator(&config)?;
    let answer = orchestrator.answer(question).await?;
    println!("{answer}");

    Ok(())
}
