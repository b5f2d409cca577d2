//! `eco assemble`: Assemble and print the prompt for one message.

use clap::Args;
use eco_config::AppConfig;
use eco_core::{AssemblyRequest, EmotionalProfile, MemoryRecord, TechnicalBlock};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub struct AssembleArgs {
    /// The user's latest message
    #[arg(short, long)]
    pub message: Option<String>,

    /// User id for memory retrieval
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Display name for the greeting template
    #[arg(short, long)]
    pub name: Option<String>,

    /// Emotional profile (JSON file)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Pre-retrieved memories (JSON array file)
    #[arg(long)]
    pub memories: Option<PathBuf>,

    /// Use the technical block as the only memory
    #[arg(long, requires = "technical_block")]
    pub force_method: bool,

    /// Technical block for forced method mode (JSON file)
    #[arg(long)]
    pub technical_block: Option<PathBuf>,

    /// Print an assembly report (JSON) to stderr
    #[arg(long)]
    pub report: bool,
}

pub async fn run(config: &AppConfig, args: AssembleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let report_requested = args.report;
    let request = build_request(args)?;

    let builder = eco_assembler::build_from_config(config).await?;
    let (prompt, report) = builder.assemble_with_report(&request).await;

    println!("{prompt}");
    if report_requested {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Turn CLI arguments into an assembly request, reading JSON inputs.
pub fn build_request(args: AssembleArgs) -> Result<AssemblyRequest, Box<dyn std::error::Error>> {
    let profile: Option<EmotionalProfile> = args.profile.as_deref().map(read_json).transpose()?;
    let memories: Option<Vec<MemoryRecord>> = args.memories.as_deref().map(read_json).transpose()?;
    let technical_block: Option<TechnicalBlock> =
        args.technical_block.as_deref().map(read_json).transpose()?;

    Ok(AssemblyRequest {
        profile,
        message: args.message,
        user_id: args.user_id,
        user_name: args.name,
        memories,
        force_method: args.force_method,
        technical_block,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid JSON in {}: {e}", path.display()))?;
    Ok(value)
}
