use clap::{Parser, ValueEnum};
use dialogue_schema::prelude::*;
use serde_json::json;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FragmentCli {
    /// Decide by file name: trigger.json, nodes.json, model.json, entities.json
    Auto,
    Document,
    Trigger,
    Nodes,
    Properties,
}

/// Validates dialogue definition files and reports every problem found
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files to validate; `-` reads standard input
    #[arg(required = true)]
    paths: Vec<String>,

    /// Which part of a dialogue the files hold
    #[arg(long, value_enum, default_value = "auto")]
    fragment: FragmentCli,

    /// JSON file with validator settings
    #[arg(long)]
    config: Option<String>,

    /// Maximum expression nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print nothing for accepted files
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let validator = build_validator(&cli);

    let mut rejected = 0;
    let mut results = Vec::with_capacity(cli.paths.len());
    for path in &cli.paths {
        let text = read_input(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
        let fragment = match cli.fragment {
            FragmentCli::Auto => Fragment::from_file_name(Path::new(path)),
            FragmentCli::Document => Fragment::Document,
            FragmentCli::Trigger => Fragment::Trigger,
            FragmentCli::Nodes => Fragment::Nodes,
            FragmentCli::Properties => Fragment::Properties,
        };
        tracing::debug!(path = %path, ?fragment, "validating");

        let report = validator.validate_fragment(fragment, &text);
        if !report.is_accepted() {
            rejected += 1;
        }
        results.push((path, report));
    }

    match cli.format {
        OutputFormat::Text => {
            for (path, report) in &results {
                if report.is_accepted() {
                    if !cli.quiet {
                        println!("{}: accepted", path);
                    }
                    continue;
                }
                println!("{}: {} problem(s)", path, report.len());
                for diagnostic in report.iter() {
                    println!("  {}", diagnostic);
                }
            }
        }
        OutputFormat::Json => {
            let files: Vec<_> = results
                .iter()
                .filter(|(_, report)| !(cli.quiet && report.is_accepted()))
                .map(|(path, report)| {
                    json!({
                        "file": path,
                        "accepted": report.is_accepted(),
                        "diagnostics": report.to_json(),
                    })
                })
                .collect();
            let rendered = serde_json::to_string_pretty(&files)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to render report: {}", e)));
            println!("{}", rendered);
        }
    }

    if rejected > 0 {
        std::process::exit(1);
    }
}

fn build_validator(cli: &Cli) -> Validator {
    let config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config '{}': {}", path, e))
            });
            serde_json::from_str::<ValidatorConfig>(&text).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to parse config '{}': {}", path, e))
            })
        }
        None => ValidatorConfig::default(),
    };

    let mut builder = Validator::builder().with_config(config);
    if let Some(max_depth) = cli.max_depth {
        builder = builder.max_depth(max_depth);
    }
    builder.build()
}

fn read_input(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path)
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(2);
}
