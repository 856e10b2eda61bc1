//! swagspec CLI - contract-test an API against its OpenAPI declarations

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use swagspec_core::contract::{generate_schema, load_examples};
use swagspec_core::dryrun::{plan_examples, validate_base_paths, validate_config};
use swagspec_core::{
    Config, DocumentAssembler, DocumentStore, DryRunPlan, Outcome, RunReport, VerdictStatus,
    to_http_file,
};
use swagspec_runner::{ContractRunner, HttpTransport};

const CONFIG_FILE: &str = ".swagspec.toml";

#[derive(Parser)]
#[command(name = "swagspec")]
#[command(about = "Contract-test an HTTP API against its OpenAPI declarations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Config file (default: .swagspec.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log built requests and outcomes
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every contract example against the server
    Check {
        /// Build requests and validate config without sending anything
        #[arg(long)]
        dry_run: bool,

        /// Where reproductions.http is written
        #[arg(long, default_value = ".swagspec")]
        report_dir: PathBuf,
    },

    /// Merge contract examples into the documents and write them
    Swaggerize {
        /// Output directory (default: config output_dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the contract file format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Ok(match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    })
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check {
            dry_run,
            report_dir,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            logging::init_logging(cli.verbose || cfg.debug)?;

            if dry_run {
                let mut plan = DryRunPlan {
                    examples: Vec::new(),
                    validations: validate_config(&cfg),
                };
                if !plan.has_errors() {
                    let store = DocumentStore::load(&cfg.documents)?;
                    let examples = load_examples(&cfg.contracts)?;
                    plan.validations.extend(validate_base_paths(&cfg, &store));
                    plan.examples = plan_examples(&store, cfg.header_casing, &examples);
                }
                match cli.output {
                    OutputFormat::Terminal => println!("{}", plan.to_terminal()),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                    OutputFormat::Silent => {}
                }
                return Ok(i32::from(plan.has_errors()));
            }

            let store = DocumentStore::load(&cfg.documents)?;
            let examples = load_examples(&cfg.contracts)?;
            for warning in validate_base_paths(&cfg, &store) {
                tracing::warn!(check = %warning.check, "{}", warning.message);
            }

            if cli.output == OutputFormat::Terminal {
                eprintln!("Config:");
                eprintln!("  base_url:  {}", cfg.base_url);
                eprintln!("  documents: {}", store.len());
                eprintln!("  examples:  {}", examples.len());
                if !cfg.headers.is_empty() {
                    eprintln!("  headers:   {} configured", cfg.headers.len());
                }
                eprintln!();
            }

            let transport = HttpTransport::from_config(&cfg)?;
            let runner = ContractRunner::new(&store, transport).with_casing(cfg.header_casing);
            let report = runner.run_all(&examples);

            match cli.output {
                OutputFormat::Terminal => {
                    print_report(&report);
                    if report.problems().any(|o| o.request.is_some()) {
                        write_reproductions(&report, &report_dir);
                    }
                }
                OutputFormat::Json => {
                    let json_output = serde_json::json!({
                        "verdict": {
                            "status": report.status().to_string(),
                            "exit_code": report.exit_code(),
                            "reason": report.reason(),
                        },
                        "stats": {
                            "total": report.total(),
                            "passed": report.passed(),
                            "failed": report.failed(),
                            "errors": report.errored(),
                        },
                        "outcomes": report.outcomes,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            Ok(report.exit_code())
        }

        Commands::Swaggerize { output_dir } => {
            let cfg = load_config(cli.config.as_deref())?;
            logging::init_logging(cli.verbose || cfg.debug)?;

            let store = DocumentStore::load(&cfg.documents)?;
            let examples = load_examples(&cfg.contracts)?;

            let mut assembler = DocumentAssembler::new(&store);
            assembler.extend(examples.iter().map(|e| &e.metadata))?;
            let written = assembler.write_all(output_dir.as_deref().unwrap_or(cfg.output_dir.as_path()))?;

            if cli.output != OutputFormat::Silent {
                println!("Merged {} examples", examples.len());
                for path in &written {
                    println!("  wrote {}", path.display());
                }
            }
            Ok(0)
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, Config::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: server to test");
            println!("  - documents: seed OpenAPI / Swagger files");
            println!("  - contracts: example declarations to run");
            println!("  - headers: auth tokens, API keys");
            Ok(0)
        }

        Commands::Schema => {
            println!("{}", generate_schema());
            Ok(0)
        }
    }
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        let tag = match outcome.outcome {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Errored { .. } => "ERROR",
        };
        println!("  [{tag}] {} -> {}", outcome.label, outcome.code);
        if let Some(message) = outcome.outcome.message() {
            println!("         {message}");
        }
    }

    let icon = if report.status() == VerdictStatus::Pass {
        "PASS"
    } else {
        "FAIL"
    };
    println!("\n{icon}: {}", report.reason());
    println!(
        "  Examples: {} total, {} passed, {} failed, {} errors",
        report.total(),
        report.passed(),
        report.failed(),
        report.errored()
    );
    println!("  Exit code: {}", report.exit_code());
}

fn write_reproductions(report: &RunReport, dir: &Path) {
    let http_path = dir.join("reproductions.http");
    let http_content = to_http_file(report.problems(), "base_url");
    let written = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&http_path, &http_content));
    if let Err(e) = written {
        eprintln!("Warning: failed to write .http file: {e}");
    } else {
        println!("Reproductions: {}", http_path.display());
    }
}
