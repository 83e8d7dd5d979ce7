//! Firesight CLI: wildfire risk prediction from the command line.
//!
//! ```text
//! firesight predict --temperature 38 --humidity 12 --wind-speed 45 \
//!     --precipitation 0 --soil-moisture 8 --vegetation-index 0.15 --human-activity high
//! firesight predict --input conditions.yaml --format json
//! firesight validate --input conditions.yaml
//! firesight prompt --humidity 20
//! firesight defaults > conditions.yaml
//! firesight providers
//! ```
//!
//! Exit codes: 0 success, 2 invalid input, 1 any other error.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use firesight_core::prompt::feature_lines;
use firesight_core::{render_prompt, FeatureRecord, HumanActivity, RawFeatures, RiskLevel};
use firesight_runtime::{PredictionReport, PredictorConfig, ProviderRegistry, WildfirePredictor};

const EXIT_INVALID_INPUT: u8 = 2;
const DEFAULT_CONFIG_FILE: &str = "firesight.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "firesight",
    version,
    about = "AI-assisted wildfire risk assessment",
    long_about = "firesight sends environmental readings to a generative model and \
        reports the predicted wildfire risk.\n\n\
        Readings start from the default form values (or --input FILE) and are \
        overridden by individual flags. Invalid readings are rejected before any \
        request is made."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict wildfire risk for the given readings
    Predict(PredictArgs),
    /// Check readings without contacting any model
    Validate(FeatureArgs),
    /// Print the prompt that would be sent (dry run)
    Prompt(FeatureArgs),
    /// Print the default readings as an input-file template
    Defaults(DefaultsArgs),
    /// List the providers `predict --provider` accepts
    Providers,
}

/// Readings, from a file and/or individual flags.
#[derive(Debug, Clone, Default, Args)]
struct FeatureArgs {
    /// YAML or JSON file with readings (camelCase keys)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Temperature in °C (-50 to 60)
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f64>,

    /// Relative humidity in % (0 to 100)
    #[arg(long)]
    humidity: Option<f64>,

    /// Wind speed in km/h (0 to 200)
    #[arg(long)]
    wind_speed: Option<f64>,

    /// Precipitation over the last 7 days in mm (0 to 1000)
    #[arg(long)]
    precipitation: Option<f64>,

    /// Soil moisture in % (0 to 100)
    #[arg(long)]
    soil_moisture: Option<f64>,

    /// Vegetation index, NDVI (-1 to 1)
    #[arg(long, allow_negative_numbers = true)]
    vegetation_index: Option<f64>,

    /// Human activity level
    #[arg(long, value_name = "low|medium|high")]
    human_activity: Option<HumanActivity>,
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[command(flatten)]
    features: FeatureArgs,

    /// Predictor configuration file (YAML or JSON)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Provider to use; see `firesight providers`
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Answer with a recorded reply instead of calling the API
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct DefaultsArgs {
    /// Template format
    #[arg(long, value_enum, default_value_t = TemplateFormat::Yaml)]
    format: TemplateFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TemplateFormat {
    Yaml,
    Json,
}

impl FeatureArgs {
    fn overrides(&self) -> RawFeatures {
        RawFeatures {
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            precipitation: self.precipitation,
            soil_moisture: self.soil_moisture,
            vegetation_index: self.vegetation_index,
            human_activity: self.human_activity,
        }
    }

    /// File values (or the defaults) with flag overrides applied.
    fn collect(&self) -> Result<RawFeatures> {
        let base = match &self.input {
            Some(path) => RawFeatures::from_file(path)
                .with_context(|| format!("failed to read readings from {}", path.display()))?,
            None => RawFeatures::from(&FeatureRecord::default()),
        };
        Ok(base.overlay(self.overrides()))
    }

    /// Validated record, or `None` after reporting every violation.
    fn record(&self) -> Result<Option<FeatureRecord>> {
        match self.collect()?.validate() {
            Ok(record) => Ok(Some(record)),
            Err(errors) => {
                eprintln!("Invalid input:");
                for violation in errors.violations() {
                    eprintln!("  - {violation}");
                }
                tracing::debug!(fields = ?errors.fields(), "Input rejected");
                Ok(None)
            }
        }
    }
}

impl PredictArgs {
    fn predictor_config(&self) -> Result<PredictorConfig> {
        let mut config = PredictorConfig::load(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))?;

        if let Some(provider) = &self.provider {
            config.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(path) = &self.replay {
            config.provider = "replay".to_string();
            config.replay_file = Some(path.clone());
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Predict(args) => cmd_predict(args).await,
        Command::Validate(args) => cmd_validate(&args),
        Command::Prompt(args) => cmd_prompt(&args),
        Command::Defaults(args) => cmd_defaults(&args),
        Command::Providers => cmd_providers(),
    }
}

async fn cmd_predict(args: PredictArgs) -> Result<ExitCode> {
    let Some(features) = args.features.record()? else {
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    };

    let config = args.predictor_config()?;
    tracing::debug!(?config, "Predictor configuration");

    let registry = ProviderRegistry::with_defaults();
    let predictor = WildfirePredictor::from_config(&config, &registry)
        .with_context(|| format!("failed to set up provider '{}'", config.provider))?;

    eprintln!("Predicting...");
    let report = predictor.assess(&features).await?;

    match args.format {
        OutputFormat::Text => print!("{}", render_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(args: &FeatureArgs) -> Result<ExitCode> {
    let Some(features) = args.record()? else {
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    };

    println!("Input is valid:");
    for line in feature_lines(&features) {
        println!("{line}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_prompt(args: &FeatureArgs) -> Result<ExitCode> {
    let Some(features) = args.record()? else {
        return Ok(ExitCode::from(EXIT_INVALID_INPUT));
    };

    println!("{}", render_prompt(&features));
    Ok(ExitCode::SUCCESS)
}

fn cmd_defaults(args: &DefaultsArgs) -> Result<ExitCode> {
    let defaults = FeatureRecord::default();
    let text = match args.format {
        TemplateFormat::Yaml => serde_yaml::to_string(&defaults)?,
        TemplateFormat::Json => serde_json::to_string_pretty(&defaults)? + "\n",
    };
    print!("{text}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_providers() -> Result<ExitCode> {
    print!("{}", render_providers(&ProviderRegistry::with_defaults()));
    Ok(ExitCode::SUCCESS)
}

fn render_providers(registry: &ProviderRegistry) -> String {
    let entries = registry.describe();
    let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, description) in entries {
        let _ = writeln!(out, "{name:<width$}  {description}");
    }
    out
}

/// Five-cell gauge of the risk level ("[###--]").
fn severity_gauge(level: RiskLevel) -> String {
    let filled = usize::from(level.severity());
    let total = RiskLevel::all().len();
    format!("[{}{}]", "#".repeat(filled), "-".repeat(total - filled))
}

fn render_report(report: &PredictionReport) -> String {
    let result = &report.result;
    let mut out = String::new();

    let _ = writeln!(out, "Wildfire Risk Assessment");
    let _ = writeln!(out, "========================");
    let _ = writeln!(out, "Risk Probability: {}%", result.probability_percent());
    let _ = writeln!(
        out,
        "Risk Level: {} {}",
        result.risk_level(),
        severity_gauge(result.risk_level())
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "AI Assessment:");
    let _ = writeln!(out, "{}", result.assessment());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "({} / {}, {})",
        report.provider,
        report.model,
        report.assessed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use firesight_core::{FeatureField, PredictionResult};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("firesight").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&["validate", "--temperature", "-12.5", "--human-activity", "HIGH"]);
        let Command::Validate(args) = cli.command else {
            panic!("expected validate");
        };

        let raw = args.collect().unwrap();
        assert_eq!(raw.temperature, Some(-12.5));
        assert_eq!(raw.human_activity, Some(HumanActivity::High));
        assert_eq!(raw.humidity, Some(40.0));
    }

    #[test]
    fn test_out_of_range_flag_is_rejected() {
        let args = FeatureArgs {
            humidity: Some(150.0),
            ..Default::default()
        };
        assert_eq!(
            args.collect().unwrap().validate().unwrap_err().fields(),
            vec![FeatureField::Humidity]
        );
        assert!(args.record().unwrap().is_none());
    }

    #[test]
    fn test_unknown_activity_is_a_usage_error() {
        let result = Cli::try_parse_from(["firesight", "validate", "--human-activity", "extreme"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_replay_flag_selects_replay_provider() {
        let cli = parse(&[
            "predict",
            "--config",
            "/nonexistent/firesight.yaml",
            "--replay",
            "reply.json",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };

        let config = args.predictor_config().unwrap();
        assert_eq!(config.provider, "replay");
        assert_eq!(config.replay_file, Some(PathBuf::from("reply.json")));
    }

    #[test]
    fn test_providers_lists_registry() {
        assert!(matches!(parse(&["providers"]).command, Command::Providers));

        let text = render_providers(&ProviderRegistry::with_defaults());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "gemini  Google Gemini generateContent API with JSON output",
                "replay  Offline provider replaying a recorded reply",
            ]
        );
    }

    #[test]
    fn test_severity_gauge() {
        assert_eq!(severity_gauge(RiskLevel::Low), "[#----]");
        assert_eq!(severity_gauge(RiskLevel::Extreme), "[#####]");
    }

    #[test]
    fn test_render_report() {
        let report = PredictionReport {
            features: FeatureRecord::default(),
            result: PredictionResult::new(0.82, RiskLevel::VeryHigh, "Dry and windy."),
            provider: "replay".to_string(),
            model: "gemini-2.5-flash-preview-04-17".to_string(),
            assessed_at: "2025-06-01T12:00:00Z".parse().unwrap(),
            usage: None,
        };

        let text = render_report(&report);
        assert!(text.contains("Risk Probability: 82.0%"));
        assert!(text.contains("Risk Level: Very High [####-]"));
        assert!(text.contains("AI Assessment:\nDry and windy."));
        assert!(text.contains("2025-06-01 12:00:00 UTC"));
    }
}
