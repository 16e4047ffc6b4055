#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod conversation;

use std::path::Path;

use args::Args;
use clap::Parser;
use conversation::{ConversationFile, Turn};
use prism_config::{Config, GenerationConfig, ImagesConfig};
use prism_core::Classify;
use prism_images::ImageHandler;
use prism_llm::{FormatterRegistry, PromptError};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = load_config(&args.config)?;

    // Initialize telemetry
    let _telemetry_guard = prism_telemetry::init(config.telemetry.as_ref(), "info")?;

    if args.list_providers {
        for provider in FormatterRegistry::new().get_supported_providers() {
            println!("{provider}");
        }
        return Ok(());
    }

    let Some(path) = args.conversation.as_deref() else {
        anyhow::bail!("--conversation is required");
    };
    let turns = ConversationFile::load(path)?.turns()?;

    tracing::info!(
        config_path = %args.config.display(),
        conversation = %path.display(),
        provider = %args.provider,
        blocking = args.blocking,
        "assembling prompt"
    );

    let configs = config.generation_configs();
    let result = if args.blocking {
        let images = image_handler(&config.images)?;
        assemble_blocking(images, configs, turns, &args.provider)
    } else {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(async {
            let images = ImageHandler::from_config(&config.images).await;
            assemble(images, configs, turns, &args.provider).await
        })
    };

    match result {
        Ok(payload) => {
            println!("{payload}");
            Ok(())
        }
        Err(e) => {
            tracing::error!(kind = %e.kind(), caller_fault = e.is_caller_fault(), error = %e, "prompt assembly failed");
            Err(e.into())
        }
    }
}

/// Load the config file, falling back to defaults when it does not exist
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        eprintln!("config file {} not found, using defaults", path.display());
        Ok(Config::default())
    }
}

/// Build the configured image handler on a throwaway runtime
///
/// The runtime is gone before any blocking fetch starts, so HTTP and S3
/// sources are free to block the calling thread.
fn image_handler(config: &ImagesConfig) -> anyhow::Result<ImageHandler> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(ImageHandler::from_config(config)))
}

async fn assemble(
    images: ImageHandler,
    configs: Vec<GenerationConfig>,
    turns: Vec<Turn>,
    provider: &str,
) -> Result<String, PromptError> {
    let mut builder = prism_llm::PromptBuilder::with_image_handler(images);
    for config in configs {
        builder.add_config(config)?;
    }

    for turn in turns {
        match turn {
            Turn::Message(message) => {
                builder.add_message(message);
            }
            Turn::Image(reference) => {
                builder.add_image_message(reference).await?;
            }
        }
    }

    builder.get_prompt_for(provider).await
}

fn assemble_blocking(
    images: ImageHandler,
    configs: Vec<GenerationConfig>,
    turns: Vec<Turn>,
    provider: &str,
) -> Result<String, PromptError> {
    let mut builder = prism_llm::blocking::PromptBuilder::with_image_handler(images);
    for config in configs {
        builder.add_config(config)?;
    }

    for turn in turns {
        match turn {
            Turn::Message(message) => builder.add_message(message),
            Turn::Image(reference) => builder.add_image_message(reference),
        };
    }

    builder.get_prompt_for(provider)
}
