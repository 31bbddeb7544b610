use clap::{Parser, Subcommand, ValueEnum};

use kubeaudit::commands;
use kubeaudit::exit_codes::*;

/// Initialize the logger based on the verbose flag.
fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

/// Output format for scan results.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable findings with per-rule and per-unit summaries.
    Text,
    /// Machine-readable JSON report.
    Json,
}

#[derive(Parser)]
#[command(name = "kubeaudit")]
#[command(about = "Audit Go source trees for Kubernetes client usage anti-patterns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan source trees and report findings
    Scan {
        /// Directories to scan (each may contain many Go packages)
        #[arg(value_name = "PATH", default_value = ".")]
        paths: Vec<String>,
        /// Comma-separated rule IDs to run exclusively (e.g. K8S001,K8S011)
        #[arg(long, value_name = "IDS")]
        rules: Option<String>,
        /// Comma-separated rule IDs to disable (added to the default set)
        #[arg(long, value_name = "IDS")]
        disable: Option<String>,
        /// Run every rule, including the default-disabled ones
        #[arg(long)]
        all_rules: bool,
        /// Output format
        #[arg(long, value_name = "FORMAT", default_value = "text")]
        format: OutputFormat,
        /// Enable verbose logging
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// List the rule catalog
    Rules,
    /// Clone or update every repository of a GitHub organization
    CloneOrg {
        /// GitHub organization to mirror
        #[arg(long, value_name = "ORG")]
        org: String,
        /// Destination directory for repositories
        #[arg(long, value_name = "DIR", default_value = "sources")]
        dest: String,
        /// Shallow-clone history depth
        #[arg(long, value_name = "N", default_value = "1")]
        depth: u32,
        /// Per-repository git timeout in seconds
        #[arg(long, value_name = "SECS", default_value = "300")]
        timeout: u64,
        /// List repositories but skip cloning/updating
        #[arg(long)]
        skip_clone: bool,
        /// Enable verbose logging
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = run_command(cli.command).await;
    std::process::exit(exit_code);
}

async fn run_command(command: Commands) -> i32 {
    match command {
        Commands::Scan {
            paths,
            rules,
            disable,
            all_rules,
            format,
            verbose,
        } => {
            init_logger(verbose);
            let args = commands::scan::ScanArgs {
                paths,
                rules,
                disable,
                all_rules,
                json: matches!(format, OutputFormat::Json),
            };
            match commands::scan::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Scan error: {e}");
                    EXIT_ERROR
                }
            }
        }
        Commands::Rules => {
            commands::rules::execute();
            EXIT_OK
        }
        Commands::CloneOrg {
            org,
            dest,
            depth,
            timeout,
            skip_clone,
            verbose,
        } => {
            init_logger(verbose);
            let args = commands::clone_org::CloneOrgArgs {
                org,
                dest,
                depth,
                timeout_secs: timeout,
                skip_clone,
            };
            match commands::clone_org::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Clone error: {e}");
                    EXIT_ERROR
                }
            }
        }
    }
}
