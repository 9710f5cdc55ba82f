//! CLI tool for finding modules that are due for a release

use clap::{CommandFactory, Parser};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use release_planning::{
    plan_releases, summary_lines, write_reports, ForgeClient, GitHubClient, NetworkConfig,
    Options, PlanningError, DEFAULT_MODULE_FILE, TOKEN_ENV_VAR,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "release-planning")]
#[command(about = "Report which modules are due for a release", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of commits since release
    #[arg(short = 'c', long = "commit-threshold", value_name = "NUM")]
    commit_threshold: Option<u64>,

    /// Tag regex
    #[arg(short = 'g', long = "tag-regex", value_name = "REGEX")]
    tag_regex: Option<String>,

    /// Days since release
    #[arg(short = 'm', long = "time-threshold", value_name = "DAYS")]
    time_threshold: Option<u64>,

    /// GitHub namespace
    #[arg(short = 'n', long, value_name = "NAME", conflicts_with = "file")]
    namespace: Option<String>,

    /// Repository regex
    #[arg(short = 'r', long = "repo-regex", value_name = "REGEX")]
    repo_regex: Option<String>,

    /// Module list file (JSON)
    #[arg(
        short = 'f',
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = DEFAULT_MODULE_FILE
    )]
    file: Option<PathBuf>,

    /// OAuth token
    #[arg(short = 't', long = "oauth-token", value_name = "TOKEN", env = TOKEN_ENV_VAR, hide_env_values = true)]
    oauth_token: Option<String>,

    /// More output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Creates html+json output
    #[arg(short = 'o', long)]
    output: bool,

    /// Directory the html+json output is written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Select only Puppet Labs' supported modules
    #[arg(long = "puppetlabs-supported", conflicts_with = "file")]
    puppetlabs_supported: bool,

    /// Count commits that came from maintenance pull requests
    #[arg(long)]
    track_maintenance: bool,

    /// Label that marks a maintenance pull request
    #[arg(long, value_name = "LABEL", requires = "track_maintenance")]
    maintenance_label: Option<String>,

    /// Look up Forge download counts
    #[arg(long)]
    downloads: bool,

    /// Path to a network configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Load configuration
    let network = if let Some(config_path) = &cli.config {
        match load_network_config(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} Failed to load config: {:#}", "Error:".red().bold(), e);
                process::exit(1);
            }
        }
    } else {
        NetworkConfig::default()
    };

    let options = Options {
        namespace: cli.namespace,
        file: cli.file,
        repo_regex: cli.repo_regex,
        tag_regex: cli.tag_regex,
        commit_threshold: cli.commit_threshold,
        time_threshold: cli.time_threshold,
        oauth_token: cli.oauth_token,
        verbose: cli.verbose,
        output: cli.output,
        output_dir: cli.output_dir,
        puppetlabs_supported: cli.puppetlabs_supported,
        track_maintenance: cli.track_maintenance,
        maintenance_label: cli.maintenance_label,
        downloads: cli.downloads,
        network,
    };

    let config = match options.resolve() {
        Ok(config) => config,
        Err(e @ PlanningError::MissingRequiredOption(_)) => {
            println!("{}", e);
            println!("{}", Cli::command().render_help());
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    let clients = GitHubClient::new(&config.oauth_token, &config.network)
        .and_then(|github| Ok((github, ForgeClient::new(&config.network)?)));
    let (github, forge) = match clients {
        Ok(clients) => clients,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    // Collect release state
    let spinner = if config.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Surveying repositories...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = plan_releases(&config, &github, &forge, chrono::Utc::now()).await;

    spinner.finish_and_clear();

    let plan = match result {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    if config.verbose {
        for failure in plan.failures {
            eprintln!("{}", PlanningError::from(failure).to_string().yellow());
        }
    }

    for line in summary_lines(&plan.due) {
        println!("{}", line);
    }
    println!(
        "\n{} {} of {} modules are due for release",
        "Summary:".bold(),
        plan.due.len().to_string().cyan(),
        plan.candidates.len()
    );

    if config.output {
        let mut failed = false;
        for written in write_reports(&plan.due, &config.output_dir) {
            match written.result {
                Ok(()) => println!("Report written to: {}", written.path.display()),
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                    failed = true;
                }
            }
        }
        if failed {
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_network_config(path: &Path) -> anyhow::Result<NetworkConfig> {
    use anyhow::Context;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: NetworkConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}
