//! CLI command definitions and handlers

use clap::{Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::{AppConfig, TranslatorConfig};
use crate::core::models::{TranslationResult, AUTO};
use crate::engines::EngineKind;

/// How a result is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain translation text
    Text,
    /// Full result record as JSON
    Json,
    /// Full result record as YAML
    Yaml,
}

/// Commands for the translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text (reads stdin when no text is given)
    Translate {
        /// Text to translate
        text: Vec<String>,

        /// Translation service
        #[arg(short, long, value_enum, default_value_t = EngineKind::Google)]
        engine: EngineKind,

        /// Source language (auto-detect if not specified)
        #[arg(short, long, default_value = AUTO)]
        from: String,

        /// Target language (auto-detect if not specified)
        #[arg(short, long, default_value = AUTO)]
        to: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Include the raw service response in JSON/YAML output
        #[arg(long)]
        raw: bool,
    },

    /// List available translation services
    Engines,
}

/// Settings given on the command line that override the config file
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration file, the default location when unset
    pub config: Option<PathBuf>,
    /// Proxy overriding the configured one
    pub proxy: Option<String>,
    /// Timeout in seconds overriding the configured one
    pub timeout: Option<f64>,
}

impl GlobalOptions {
    fn overrides(&self) -> TranslatorConfig {
        TranslatorConfig {
            proxy: self.proxy.clone(),
            timeout: self.timeout,
            ..Default::default()
        }
    }
}

/// Effective options for `engine`: file/env configuration plus CLI overrides
pub fn engine_config(
    options: &GlobalOptions,
    engine: EngineKind,
) -> anyhow::Result<TranslatorConfig> {
    let app_config = AppConfig::load(options.config.as_deref())?;
    let config = app_config.for_engine(engine.name()).merge(&options.overrides());
    config.validate()?;
    Ok(config)
}

/// Render a result in the requested format
pub fn render(result: &TranslationResult, format: OutputFormat, raw: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(result.to_string()),
        OutputFormat::Json | OutputFormat::Yaml => {
            let mut record = result.clone();
            if !raw {
                record.raw = serde_json::Value::Null;
            }
            if format == OutputFormat::Json {
                Ok(serde_json::to_string_pretty(&record)?)
            } else {
                Ok(serde_yaml::to_string(&record)?)
            }
        }
    }
}

fn read_text(words: Vec<String>) -> anyhow::Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    let text = text.trim().to_string();
    if text.is_empty() {
        anyhow::bail!("Nothing to translate");
    }
    Ok(text)
}

/// Handle translate command
pub async fn handle_translate(
    options: &GlobalOptions,
    text: Vec<String>,
    engine: EngineKind,
    from: String,
    to: String,
    format: OutputFormat,
    raw: bool,
) -> anyhow::Result<()> {
    let text = read_text(text)?;
    let config = engine_config(options, engine)?;
    debug!("Effective {} options: {:?}", engine, config);

    let translator = engine.create(&config)?;

    let spinner = if format == OutputFormat::Text {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        spinner.set_message(format!("Translating with {}...", engine));
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    } else {
        ProgressBar::hidden()
    };

    let outcome = translator.translate(&from, &to, &text).await;
    spinner.finish_and_clear();

    let result = outcome?;
    info!(
        "{}: {} -> {} (success: {})",
        engine, result.source_lang, result.target_lang, result.success
    );

    let rendered = render(&result, format, raw)?;
    if result.success || format != OutputFormat::Text {
        println!("{}", rendered);
    }

    if !result.success {
        anyhow::bail!(
            "{} failed: {}",
            engine,
            result.error_info.as_deref().unwrap_or("no translation")
        );
    }

    Ok(())
}

/// Handle engines command
pub fn handle_engines() {
    for engine in EngineKind::ALL {
        println!("{:<8} {}", engine.name(), engine.description());
    }
}
