//! dist-detach CLI
//!
//! Entry point for the `dist-detach` command-line tool.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dist_detach::config::{ConfigDocument, DEFAULT_CONFIG_PATH};
use dist_detach::{verify_working_directory, ArtifactList, DetachRun, EffectiveConfig};

#[derive(Parser)]
#[command(name = "dist-detach")]
#[command(about = "Detach distribution archives from a build and stage them with checksums", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    /// Path to config file (default: .dist/detach.toml, if present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Build output directory; the working directory defaults to <build-dir>/dist-detach
    #[arg(long)]
    build_dir: Option<PathBuf>,

    /// Working directory for staged files and checksums
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Staging destination; the run does nothing when unset or empty
    #[arg(long)]
    staging_url: Option<String>,

    /// Mark this module as not part of the distribution and skip it
    /// (`--non-dist-module=false` overrides the file and environment)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    non_dist_module: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detach, stage and checksum distribution archives
    Detach {
        /// JSON list of the build's attached artifacts
        #[arg(long, short = 'a')]
        artifacts: PathBuf,

        /// Where to write the artifacts left attached (default: overwrite --artifacts)
        #[arg(long)]
        write_remaining: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which artifacts would be detached, without touching the disk
    Classify {
        /// JSON list of the build's attached artifacts
        #[arg(long, short = 'a')]
        artifacts: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Re-check the checksums in a working directory
    Verify {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration and where it came from
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Detach {
            artifacts,
            write_remaining,
            config,
            json,
        } => run_detach_command(&artifacts, write_remaining.as_deref(), &config, json),
        Commands::Classify { artifacts, json } => run_classify(&artifacts, json),
        Commands::Verify { config, json } => run_verify(&config, json),
        Commands::Config { config } => run_config(&config),
    }
}

fn load_config(args: &ConfigArgs) -> Result<EffectiveConfig, String> {
    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let path = match &args.config {
        Some(path) => Some(path.as_path()),
        None if default_path.exists() => Some(default_path.as_path()),
        None => None,
    };

    let mut cli = ConfigDocument::default();
    cli.build.directory = args.build_dir.clone();
    cli.build.working_directory = args.working_dir.clone();
    cli.staging.url = args.staging_url.clone();
    cli.non_distribution_module = args.non_dist_module;

    EffectiveConfig::build(path, Some(cli)).map_err(|e| e.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            false
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    message
}

fn run_detach_command(
    artifacts_path: &Path,
    write_remaining: Option<&Path>,
    config_args: &ConfigArgs,
    json: bool,
) -> ExitCode {
    let config = match load_config(config_args) {
        Ok(c) => c.into_detach_config(),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut attached = match ArtifactList::load(artifacts_path) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error loading artifacts: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut run = DetachRun::new(config);
    let report = match run.execute(&mut attached) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Detachment failed: {}", error_chain(&e));
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    if !report.detached.is_empty() {
        let out = write_remaining.unwrap_or(artifacts_path);
        if let Err(e) = attached.save(out) {
            eprintln!("Error writing remaining artifacts: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if json {
        exit_code(print_json(&report))
    } else {
        print!("{}", report.to_human());
        ExitCode::SUCCESS
    }
}

fn run_classify(artifacts_path: &Path, json: bool) -> ExitCode {
    let list = match ArtifactList::load(artifacts_path) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error loading artifacts: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let classification = dist_classifier::classify(list.artifacts());
    let rows: Vec<serde_json::Value> = list
        .artifacts()
        .iter()
        .zip(&classification.decisions)
        .map(|(artifact, decision)| {
            serde_json::json!({
                "key": artifact.coordinate_key(),
                "file": artifact.file,
                "decision": decision,
            })
        })
        .collect();

    if json {
        return exit_code(print_json(&rows));
    }

    for (artifact, decision) in list.artifacts().iter().zip(&classification.decisions) {
        match decision.reason() {
            None => println!("detach  {}", artifact.coordinate_key()),
            Some(reason) => println!("keep    {}  [{}]", artifact.coordinate_key(), reason.to_code()),
        }
    }
    println!(
        "\n{} to detach, {} to keep",
        classification.detached.len(),
        classification.kept.len()
    );
    ExitCode::SUCCESS
}

fn run_verify(config_args: &ConfigArgs, json: bool) -> ExitCode {
    let config = match load_config(config_args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = verify_working_directory(config.detach_config().working_directory());

    if json {
        if !print_json(&result) {
            return ExitCode::FAILURE;
        }
    } else {
        println!("{}", result.summary);
        for error in result.errors.iter().skip(1) {
            println!("  {}", error);
        }
    }

    exit_code(result.passed)
}

fn run_config(config_args: &ConfigArgs) -> ExitCode {
    match load_config(config_args) {
        Ok(config) => exit_code(print_json(&config)),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            ExitCode::FAILURE
        }
    }
}
