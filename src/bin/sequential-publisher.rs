//! Sequential Publisher CLI
//!
//! Publishes interdependent packages in a fixed order, pausing between
//! publishes so the registry can catch up.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sequential_publisher::core::config::{CommandConfig, TaskConfig};
use sequential_publisher::core::config_loader::CONFIG_FILENAME;
use sequential_publisher::telemetry::init_tracing;
use sequential_publisher::validation::ManifestValidator;
use sequential_publisher::{
    ConfigLoadOptions, ConfigLoader, PublishConfig, PublishOptions, PublishTask,
    SafeCommandExecutor, SequentialPublisher, WorkingDirectory,
};
use std::path::{Path, PathBuf};
use std::process;

/// Ordered multi-package publishing with registry propagation delay
#[derive(Parser)]
#[command(name = "sequential-publisher")]
#[command(version)]
#[command(about = "Publish interdependent packages in order, one at a time", long_about = None)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Task settings that override the configuration file
#[derive(clap::Args, Debug)]
struct TaskArgs {
    /// Config file (defaults to PROJECT_PATH/.publish-config.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base directory the package paths are resolved against
    #[arg(long, value_name = "DIR")]
    base: Option<String>,

    /// Package directory, in publish order (repeatable)
    #[arg(short, long = "path", value_name = "DIR")]
    paths: Vec<String>,

    /// Seconds to wait after each publish
    #[arg(short, long, value_name = "SECONDS")]
    delay: Option<u64>,

    /// Also wait after the last package
    #[arg(long)]
    delay_after_last: bool,

    /// Kill the publish tool after this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

impl TaskArgs {
    fn to_config(&self) -> PublishConfig {
        PublishConfig {
            task: TaskConfig {
                base_path: self.base.clone(),
                paths: (!self.paths.is_empty()).then(|| self.paths.clone()),
                delay_seconds: self.delay,
                delay_after_last: self.delay_after_last.then_some(true),
            },
            command: CommandConfig {
                timeout_seconds: self.timeout,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Publish every package, in order
    Publish {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        #[command(flatten)]
        task: TaskArgs,

        /// Check directories and print the plan without publishing
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every package directory is ready to publish
    Check {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        #[command(flatten)]
        task: TaskArgs,
    },

    /// Show the publish order and expected delay
    Plan {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        #[command(flatten)]
        task: TaskArgs,
    },

    /// Write a default .publish-config.yaml
    Init {
        /// Project path (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Publish {
            project_path,
            task,
            dry_run,
            json,
        } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            publish_command(path, task, dry_run, json).await
        }
        Commands::Check { project_path, task } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            check_command(path, task).await
        }
        Commands::Plan { project_path, task } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            plan_command(path, task).await
        }
        Commands::Init {
            project_path,
            force,
        } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            init_command(path, force).await
        }
    }
}

/// Load and validate configuration; `None` means validation failed and was reported
async fn load_config(project_path: &Path, task: &TaskArgs) -> Result<Option<PublishConfig>> {
    let mut options = ConfigLoadOptions::new(project_path);
    options.config_file = task.config.clone();
    options.cli_args = Some(task.to_config());

    let config = ConfigLoader::load(options).await?;

    let validation = ConfigLoader::validate(&config);
    if !validation.valid {
        eprintln!("{}", ConfigLoader::format_validation_result(&validation));
        return Ok(None);
    }
    if !validation.warnings.is_empty() {
        eprintln!("{}", ConfigLoader::format_validation_result(&validation));
    }

    Ok(Some(config))
}

async fn publish_command(
    project_path: PathBuf,
    task_args: TaskArgs,
    dry_run: bool,
    json: bool,
) -> Result<i32> {
    // With --json, stdout carries only the report
    if json {
        eprintln!("\n📦 sequential-publisher\n");
    } else {
        println!("\n📦 sequential-publisher\n");
    }

    let Some(config) = load_config(&project_path, &task_args).await? else {
        return Ok(1);
    };

    let task = PublishTask::from_config(&config, &project_path)?;
    let mut executor = SafeCommandExecutor::from_config(&config.command)
        .context("Invalid publish command")?;
    executor.set_stdout_to_stderr(json);

    let mut options = PublishOptions::from_config(&config);
    options.dry_run = dry_run;
    options.progress_to_stderr = json;

    let publisher = SequentialPublisher::new(executor, options);
    let mut cwd = WorkingDirectory::from_process()?;

    let (report, outcome) = publisher.run_with_report(&task, &mut cwd).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match outcome {
        Ok(()) => {
            let message = if dry_run {
                "\n✅ Dry run completed, nothing was published"
            } else {
                "\n✅ Publishing completed successfully!"
            };
            if json {
                eprintln!("{}", message);
            } else {
                println!("{}", message);
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("\n❌ Publishing failed [{}]: {}", e.code(), e);
            for action in e.suggested_actions() {
                eprintln!("  💡 {}", action);
            }
            Ok(e.exit_code())
        }
    }
}

async fn check_command(project_path: PathBuf, task_args: TaskArgs) -> Result<i32> {
    println!("\n🔍 Package Check\n");

    let Some(config) = load_config(&project_path, &task_args).await? else {
        return Ok(1);
    };
    let task = PublishTask::from_config(&config, &project_path)?;

    if let Err(e) = SafeCommandExecutor::from_config(&config.command) {
        println!("❌ Publish command: {}", e);
        return Ok(1);
    }

    let validator = ManifestValidator::new();
    let mut all_valid = true;

    for (index, dir) in task.iter().enumerate() {
        println!("\n📦 [{}/{}] {}:", index + 1, task.len(), dir.display());

        if !dir.is_dir() {
            println!("  ❌ Directory not found");
            all_valid = false;
            continue;
        }

        match validator.validate_dir(dir).await {
            Ok(result) => {
                if let Some(metadata) = &result.metadata {
                    println!("  {} {}", metadata.name, metadata.version);
                }

                if result.is_valid {
                    println!("  ✅ Validation successful");
                } else {
                    all_valid = false;
                    println!("  ❌ Validation failed");
                    for error in &result.errors {
                        println!("    - {}", error);
                    }
                }

                if !result.warnings.is_empty() {
                    println!("  ⚠️  Warnings:");
                    for warning in &result.warnings {
                        println!("    - {}", warning);
                    }
                }
            }
            Err(e) => {
                all_valid = false;
                println!("  ❌ Error: {}", e);
            }
        }
    }

    println!();
    Ok(if all_valid { 0 } else { 1 })
}

async fn plan_command(project_path: PathBuf, task_args: TaskArgs) -> Result<i32> {
    println!("\n🗺️  Publish Plan\n");

    let Some(config) = load_config(&project_path, &task_args).await? else {
        return Ok(1);
    };
    let task = PublishTask::from_config(&config, &project_path)?;
    let options = PublishOptions::from_config(&config);

    println!(
        "Command: {} {}",
        config.command.program(),
        config.command.args().join(" ")
    );
    println!("Base: {}\n", task.base_path().display());

    for (index, dir) in task.iter().enumerate() {
        let marker = if dir.is_dir() { " " } else { "!" };
        println!("{} {}. {}", marker, index + 1, dir.display());
    }

    println!(
        "\nDelay: {}s x {} = {}s",
        options.delay.as_secs(),
        options.delay_count(task.len()),
        options.total_delay(task.len()).as_secs()
    );

    Ok(0)
}

async fn init_command(project_path: PathBuf, force: bool) -> Result<i32> {
    println!("\n🎯 Initialize sequential-publisher\n");

    let config_path = project_path.join(CONFIG_FILENAME);
    if config_path.exists() && !force {
        eprintln!(
            "⚠️  {} already exists (use --force to overwrite)",
            config_path.display()
        );
        return Ok(1);
    }

    let yaml = serde_yaml::to_string(&PublishConfig::explicit_defaults())?;
    tokio::fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✅ Created {}", config_path.display());
    Ok(0)
}
