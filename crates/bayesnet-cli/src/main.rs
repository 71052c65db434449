//! bayesnet CLI - exact inference over discrete Bayesian networks
//!
//! Answers batch files of joint and conditional queries, single ad-hoc
//! queries, and prints network structure.

use anyhow::{Context, Result};
use bayesnet_infer::{load_network, Algorithm, InferenceEngine, NetworkStructure};
use clap::Parser;
use std::path::{Path, PathBuf};

use bayesnet_cli::batch::{BatchInput, BatchProcessor};
use bayesnet_cli::cli::{Cli, Commands, ConfigCommand};
use bayesnet_cli::completion;
use bayesnet_cli::config::Config;
use bayesnet_cli::logging;
use bayesnet_cli::output::{
    enable_colors, format_result, print_error, print_info, print_network, print_success,
};

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if cli.no_config {
        Config::default()
    } else {
        Config::load_default()
    };

    // Override config with CLI options
    if cli.no_color {
        config.colored = false;
    }
    if cli.quiet {
        config.progress = false;
    }

    enable_colors(config.colored);
    logging::init(&config.log_level, cli.debug);

    match cli.command {
        None => run_batch(
            Path::new("input.txt"),
            Path::new("output.txt"),
            &config,
            cli.quiet,
        ),
        Some(Commands::Run {
            input,
            output,
            jobs,
        }) => {
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }
            run_batch(&input, &output, &config, cli.quiet)
        }
        Some(Commands::Query {
            network,
            query,
            algorithm,
        }) => {
            let algorithm = algorithm.unwrap_or(config.default_algorithm);
            run_query(&network, &query, algorithm, &config)
        }
        Some(Commands::Inspect { network }) => {
            let network = load(&network)?;
            print_network(&network);
            Ok(())
        }
        Some(Commands::Completion { shell }) => {
            completion::generate_for_shell(shell);
            Ok(())
        }
        Some(Commands::Config { command }) => handle_config_command(&command, &config),
    }
}

fn load(path: &Path) -> Result<NetworkStructure> {
    load_network(path).with_context(|| format!("Failed to load network: {}", path.display()))
}

fn run_batch(input: &Path, output: &Path, config: &Config, quiet: bool) -> Result<()> {
    let batch = BatchInput::read(input)?;
    let network = load(&batch.network_path)?;

    if !quiet {
        print_info(&format!(
            "{} queries against {} ({} variables)",
            batch.queries.len(),
            batch.network_path.display(),
            network.num_variables()
        ));
    }

    let result = BatchProcessor::new(&network)
        .with_jobs(config.jobs)
        .with_progress(config.progress)
        .process(&batch.queries)?;
    result.write_to(output, config.precision)?;

    if !quiet {
        result.print_summary();
        print_success(&format!("Results written to: {}", output.display()));
    }
    Ok(())
}

/// Ad-hoc query. Unlike a batch line, a failing query is fatal here.
fn run_query(network: &Path, query: &str, algorithm: u32, config: &Config) -> Result<()> {
    let network = load(network)?;
    let engine = InferenceEngine::new(&network);

    let result = if query.contains('|') {
        // an out-of-range selector is rejected even for CPT lookups
        Algorithm::from_selector(algorithm)?;
        engine.conditional_probability(query, algorithm)
    } else {
        engine.joint_probability(query)
    };
    let result = result.with_context(|| format!("Query failed: {}", query))?;

    println!("{}", format_result(&result, config.precision));
    Ok(())
}

fn handle_config_command(command: &ConfigCommand, config: &Config) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        ConfigCommand::Path => {
            let path: PathBuf = Config::config_path();
            println!("{}", path.display());
        }
        ConfigCommand::Init => {
            let path = Config::create_default()?;
            print_success(&format!("Created config file: {}", path.display()));
        }
    }

    Ok(())
}
