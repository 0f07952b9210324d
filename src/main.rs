use clap::Parser;
use cypher_filter::backend::cypher::CypherFilterConverter;
use cypher_filter::backend::filter::FilterConverter;
use cypher_filter::config::AppConfig;
use cypher_filter::error::{AppError, AppResult};
use cypher_filter::logging::{init_logging, log_translation};
use cypher_filter::parser::{EntityKind, ExpressionValidator};
use serde_json::Value;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "cypher-filter")]
#[command(about = "Translate MongoDB-style filters into Cypher WHERE fragments")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Element kind the filter applies to (node or relationship)
    #[arg(short, long, default_value = "node")]
    entity: EntityKind,

    /// Variable the filter is lowered against (overrides config file)
    #[arg(short, long)]
    reference: Option<String>,

    /// Reject unrecognized operators instead of dropping them
    #[arg(long)]
    strict: bool,

    /// Filter as inline JSON
    #[arg(short, long, conflicts_with = "file")]
    filter: Option<String>,

    /// Read the filter from a JSON or YAML file
    #[arg(long)]
    file: Option<String>,
}

fn read_filter(args: &Args) -> AppResult<Value> {
    match (&args.filter, &args.file) {
        (Some(inline), _) => Ok(serde_json::from_str(inline)?),
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                AppError::Configuration(format!("Failed to read filter file {}: {}", path, e))
            })?;
            let is_json = Path::new(path)
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
            if is_json {
                Ok(serde_json::from_str(&content)?)
            } else {
                Ok(serde_yaml::from_str(&content)?)
            }
        }
        (None, None) => Err(AppError::Configuration(
            "either --filter or --file is required".to_string(),
        )),
    }
}

fn run(args: Args) -> AppResult<String> {
    let mut app_config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default_config(),
    };

    // Override with command line arguments if provided
    if args.strict {
        app_config.validation.strict = true;
    }
    if let Some(reference) = &args.reference {
        app_config.lowering.entity_reference = reference.clone();
    }

    let raw = read_filter(&args)?;

    let start = Instant::now();
    let validator = ExpressionValidator::new(app_config.validator_options());
    let converter = CypherFilterConverter::with_options(app_config.lowerer_options());
    let expression = validator.validate(&raw, args.entity)?;
    let lowered = converter.to_where_clause(&expression, &app_config.lowering.entity_reference);
    log_translation(args.entity, &lowered, start.elapsed());

    Ok(serde_json::to_string_pretty(&lowered)?)
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging();

    match run(args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
