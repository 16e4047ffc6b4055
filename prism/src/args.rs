use std::path::PathBuf;

use clap::Parser;

/// Prism prompt assembler
#[derive(Debug, Parser)]
#[command(name = "prism", about = "Assemble multimodal conversations into LLM provider request bodies")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "prism.toml", env = "PRISM_CONFIG")]
    pub config: PathBuf,

    /// Provider to format the conversation for
    #[arg(short, long, default_value = "openai", env = "PRISM_PROVIDER")]
    pub provider: String,

    /// Conversation file with `[[messages]]` entries
    #[arg(long, required_unless_present = "list_providers")]
    pub conversation: Option<PathBuf>,

    /// Fetch images on the calling thread instead of concurrently
    #[arg(long)]
    pub blocking: bool,

    /// Print the registered provider names and exit
    #[arg(long)]
    pub list_providers: bool,
}
