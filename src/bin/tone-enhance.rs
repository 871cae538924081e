use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tone_editor::config::EditorConfig;
use tone_editor::export::{self, ExportFormat};
use tone_editor::{EditSession, Parameter};

#[derive(Parser)]
#[command(name = "tone-enhance")]
#[command(about = "Analyze an image, suggest tonal corrections and apply adjustments")]
struct Cli {
    /// Input image (any format the `image` crate decodes)
    input: PathBuf,

    /// Where to write the adjusted image
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Editor config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print analysis and suggestions as JSON
    #[arg(long)]
    analyze: bool,

    /// Apply a named preset before any --set
    #[arg(short, long)]
    preset: Option<String>,

    /// Apply all suggested corrections
    #[arg(long)]
    auto: bool,

    /// Set a parameter, e.g. --set brightness=15 (repeatable)
    #[arg(short, long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(Parameter, f32)>,

    /// Output format (defaults to the config's export format)
    #[arg(short, long)]
    format: Option<FormatArg>,

    /// JPEG quality 1-100
    #[arg(short, long)]
    quality: Option<u8>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

fn parse_assignment(s: &str) -> Result<(Parameter, f32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let param = name.parse::<Parameter>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid value for {}: {}", param, e))?;
    Ok((param, value))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    let buffer = export::decode_file(&cli.input)?;
    let mut session = EditSession::from_config(&config);
    session.load(buffer);

    if cli.analyze {
        let analysis = session.analysis()?;
        let report = serde_json::json!({
            "analysis": analysis,
            "exposure": analysis.exposure(),
            "suggestions": session.suggestions()?,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(name) = &cli.preset {
        session
            .apply_preset(name)
            .with_context(|| format!("Available presets: {}", session.presets().names().join(", ")))?;
    }
    if cli.auto {
        session.apply_suggestions()?;
    }
    for &(param, value) in &cli.set {
        session.stage_parameter(param, value)?;
    }
    let result = session.recompute()?;

    let Some(output) = &cli.output else {
        if !cli.analyze {
            bail!("Nothing to do: pass --output and/or --analyze");
        }
        return Ok(());
    };

    let format = resolve_format(&config, cli.format, cli.quality);
    export::save(&result, output, format)?;

    let settings = session.settings()?;
    let changed: Vec<String> = settings
        .iter()
        .filter(|(p, v)| *v != p.default_value())
        .map(|(p, v)| format!("{}={}", p, v))
        .collect();
    tracing::info!(output = %output.display(), settings = %changed.join(" "), "Done");

    Ok(())
}

fn resolve_format(config: &EditorConfig, format: Option<FormatArg>, quality: Option<u8>) -> ExportFormat {
    let configured_quality = match config.export.format {
        ExportFormat::Jpeg { quality } => quality,
        ExportFormat::Png => config.export.jpeg_quality,
    };
    match (format, config.export.format) {
        (Some(FormatArg::Png), _) => ExportFormat::Png,
        (Some(FormatArg::Jpeg), _) | (None, ExportFormat::Jpeg { .. }) => ExportFormat::Jpeg {
            quality: quality.unwrap_or(configured_quality),
        },
        (None, ExportFormat::Png) => ExportFormat::Png,
    }
}
