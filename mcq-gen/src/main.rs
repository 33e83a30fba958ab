mod config;
mod error;
mod export;
mod extract;
mod generate;
mod parse;
mod pipeline;
mod table;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use llm_client::{Config, ModelPreset};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::McqConfig;
use crate::error::McqError;
use crate::export::ExportFormat;
use crate::extract::Source;
use crate::generate::Generator;
use crate::pipeline::McqPipeline;
use crate::table::{McqRow, RequestMetadata};

const PROGRAM: &str = "mcq-gen";

#[derive(Parser, Debug)]
#[command(
    name = "mcq-gen",
    about = "Generate multiple-choice questions from a document or web page using AI",
    long_about = "Splits the source text into chunks, asks an LLM for questions about each chunk, and exports the results as CSV, JSON or a text table"
)]
#[command(version)]
#[command(subcommand_negates_reqs = true)]
struct Args {
    /// URL of a web page to generate questions from
    #[arg(long)]
    url: Option<String>,

    /// Local .txt, .pdf or .docx file (ignored when --url is given)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Value for the Source column (defaults to the URL or file name)
    #[arg(long)]
    source: Option<String>,

    /// Topic of the questions
    #[arg(long, required = true)]
    topic: Option<String>,

    /// Difficulty level, e.g. Easy, Medium, Hard
    #[arg(long, required = true)]
    difficulty: Option<String>,

    /// Output format: csv, json or txt
    #[arg(short, long, default_value = "txt")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model preset to use (overrides default from config)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum chunk size in characters (overrides config)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Number of chunks to generate for at once (overrides config)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Enable debug mode for verbose output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert previously exported JSON rows to another format
    Export {
        /// JSON file produced by `--format json`
        #[arg(short, long)]
        input: PathBuf,
        /// Output format: csv, json or txt
        #[arg(short, long)]
        format: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// List available presets
    List,
    /// Set the default model preset
    SetDefault {
        /// Name of the preset to use as default
        preset: String,
    },
    /// Add a new preset
    AddPreset {
        /// Preset name
        name: String,
        /// Provider (gemini, openai, openrouter, cerebras)
        #[arg(short, long)]
        provider: String,
        /// Model identifier
        #[arg(short = 'M', long)]
        model: String,
    },
    /// Set the maximum chunk size in characters
    SetChunkSize { size: usize },
    /// Set how many chunks are generated for at once
    SetConcurrency { concurrency: usize },
    /// Use the contents of a file as the prompt template
    SetTemplate {
        /// Template file; must contain {chunk}
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let client_error = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<McqError>())
                .is_some_and(McqError::is_client_error);
            if client_error {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(mut args: Args) -> Result<()> {
    match args.command.take() {
        Some(Commands::Config { action }) => handle_config_command(&action),
        Some(Commands::Export {
            input,
            format,
            output,
        }) => convert_export(&input, &format, output.as_deref()),
        None => {
            let runtime =
                tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            runtime.block_on(generate(args))
        }
    }
}

/// Extract, generate and export in one go
async fn generate(args: Args) -> Result<()> {
    // Parse the format up front so a typo fails before any LLM calls
    let format: ExportFormat = args.format.parse()?;
    let source = Source::from_args(args.url, args.file)?;
    let metadata = RequestMetadata::new(
        args.source.unwrap_or_else(|| source.label()),
        args.topic.context("--topic is required")?,
        args.difficulty.context("--difficulty is required")?,
    );

    let mut config = McqConfig::load().context("Failed to load mcq-gen config")?;
    if let Some(size) = args.chunk_size {
        config.max_chunk_size = size;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;

    let llm_config = Config::load().context("Failed to load LLM config")?;
    let generator = Generator::from_config(&config, &llm_config, args.model.as_deref())?;
    log::debug!("Generating with {}", generator.provider_name());
    let pipeline = McqPipeline::new(&config, generator)?;

    let text = extract::extract(&source).await?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")?
            .progress_chars("#>-"),
    );
    let result = pipeline.run(&text, &metadata, &progress).await;
    progress.finish_and_clear();
    let output = result?;

    if !output.anomalies.is_empty() {
        let chunks: BTreeSet<usize> = output.anomalies.iter().map(|a| a.chunk).collect();
        log::warn!(
            "Skipped {} malformed question(s) across {} chunk(s)",
            output.anomalies.len(),
            chunks.len()
        );
    }
    if output.unmatched_answers > 0 {
        log::warn!(
            "{} question(s) have an answer that matches none of their options",
            output.unmatched_answers
        );
    }

    write_output(&output.rows, format, args.output.as_deref())
}

/// Re-export JSON rows in another format
fn convert_export(input: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let rows = export::read_rows(io::BufReader::new(file))
        .with_context(|| format!("Failed to read rows from {}", input.display()))?;
    log::info!("Read {} row(s) from {}", rows.len(), input.display());
    write_output(&rows, format, output)
}

fn write_output(rows: &[McqRow], format: ExportFormat, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let path = if path.extension().is_none() {
                path.with_extension(format.extension())
            } else {
                path.to_path_buf()
            };
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export::write_rows(rows, format, &mut writer)?;
            writer.flush()?;
            eprintln!("Wrote {} question(s) to {}", rows.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            export::write_rows(rows, format, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Handle config subcommands
fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = McqConfig::load()?;
            println!("Config file: {}", McqConfig::config_path()?.display());
            println!();
            println!("{:#?}", config);
            println!();
            let llm_config = Config::load()?;
            println!("LLM config file: {}", Config::config_path()?.display());
            println!();
            println!("{:#?}", llm_config);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let current_default = McqConfig::load()?
                .model
                .unwrap_or_else(|| config.get_default_for_program(PROGRAM).to_string());
            println!("Available presets:");
            for (name, preset) in &config.presets {
                let default_marker = if *name == current_default {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "  {} - {} / {}{}",
                    name, preset.provider, preset.model, default_marker
                );
            }
        }
        ConfigAction::SetDefault { preset } => {
            let mut config = Config::load()?;
            // Verify preset exists
            config.get_preset(preset)?;
            config.defaults.insert(PROGRAM.to_string(), preset.clone());
            config.save()?;
            println!("Default preset for {} set to: {}", PROGRAM, preset);
        }
        ConfigAction::AddPreset {
            name,
            provider,
            model,
        } => {
            // Reject unknown providers now rather than on first use
            provider.parse::<llm_client::ProviderKind>()?;
            let mut config = Config::load()?;
            config.presets.insert(
                name.clone(),
                ModelPreset {
                    provider: provider.clone(),
                    model: model.clone(),
                },
            );
            config.save()?;
            println!("Added preset: {}", name);
        }
        ConfigAction::SetChunkSize { size } => {
            update_config(|config| config.max_chunk_size = *size)?;
            println!("Maximum chunk size set to: {}", size);
        }
        ConfigAction::SetConcurrency { concurrency } => {
            update_config(|config| config.concurrency = *concurrency)?;
            println!("Concurrency set to: {}", concurrency);
        }
        ConfigAction::SetTemplate { file } => {
            let template = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            update_config(|config| config.prompt_template = template)?;
            println!("Prompt template set from: {}", file.display());
        }
    }
    Ok(())
}

/// Load mcq-gen.toml, apply `change`, and save only if the result is valid
fn update_config(change: impl FnOnce(&mut McqConfig)) -> Result<()> {
    let mut config = McqConfig::load()?;
    change(&mut config);
    config.validate()?;
    config.save()
}
