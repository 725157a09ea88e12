use clap::{ArgAction, Parser, Subcommand};
use lf_app::{AppResult, NetworkSummary, RunOptions, network_service, run_service};
use lf_graph::Traversal;
use lf_solver::NewtonConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lf-cli")]
#[command(about = "LoopFlow CLI - loop and node network solver", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a network and print its flows
    Solve {
        /// Network description (.txt, .yaml, .yml or .json)
        network_path: PathBuf,
        /// Seed for transitional friction noise
        #[arg(long)]
        seed: Option<u64>,
        /// Initial unknowns, comma separated, in amperes or L/s
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        guess: Option<Vec<f64>>,
        /// Newton iteration cap
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Validate a network description and its topology
    Validate {
        /// Network description
        network_path: PathBuf,
    },
    /// Print nodes, elements and loop walks
    Inspect {
        /// Network description
        network_path: PathBuf,
    },
    /// Rewrite a description as YAML or JSON
    Convert {
        /// Source description
        input: PathBuf,
        /// Target file (.yaml, .yml or .json)
        output: PathBuf,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve {
            network_path,
            seed,
            guess,
            max_iterations,
        } => cmd_solve(&network_path, seed, guess, max_iterations),
        Commands::Validate { network_path } => cmd_validate(&network_path),
        Commands::Inspect { network_path } => cmd_inspect(&network_path),
        Commands::Convert { input, output } => cmd_convert(&input, &output),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_solve(
    network_path: &Path,
    seed: Option<u64>,
    guess: Option<Vec<f64>>,
    max_iterations: Option<usize>,
) -> AppResult<()> {
    let def = network_service::load_network(network_path)?;
    let options = RunOptions {
        seed,
        guess,
        newton: max_iterations.map(|max_iterations| NewtonConfig {
            max_iterations,
            ..NewtonConfig::default()
        }),
    };

    let report = run_service::run(&def, &options)?;
    for line in report.lines() {
        println!("{line}");
    }
    tracing::info!(iterations = report.iterations, "solved {}", report.name);
    Ok(())
}

fn cmd_validate(network_path: &Path) -> AppResult<()> {
    println!("Validating network: {}", network_path.display());
    let def = network_service::load_network(network_path)?;
    network_service::validate_network(&def)?;
    println!("✓ Network is valid");
    Ok(())
}

fn cmd_inspect(network_path: &Path) -> AppResult<()> {
    let def = network_service::load_network(network_path)?;
    let summary = network_service::summarize(&def)?;
    print_summary(&summary);
    Ok(())
}

fn cmd_convert(input: &Path, output: &Path) -> AppResult<()> {
    let def = network_service::load_network(input)?;
    network_service::save_network(output, &def)?;
    println!("✓ Wrote {}", output.display());
    Ok(())
}

fn print_summary(summary: &NetworkSummary) {
    println!("{} ({:?})", summary.name, summary.kind);

    println!("Nodes:");
    for node in &summary.nodes {
        let marker = if node.reference { "  [reference]" } else { "" };
        println!("  {:<8} demand {:>10.3}{marker}", node.name, node.demand);
    }

    println!("Elements:");
    for elem in &summary.elements {
        let role = if elem.source { "source" } else { "passive" };
        println!("  {:<8} {} -> {}  ({role})", elem.name, elem.from, elem.to);
    }

    println!("Loops:");
    for lp in &summary.loops {
        let steps: Vec<String> = lp
            .steps
            .iter()
            .map(|(name, traversal)| match traversal {
                Traversal::Forward => format!("+{name}"),
                Traversal::Reverse => format!("-{name}"),
            })
            .collect();
        println!("  {:<8} {}", lp.name, steps.join(" "));
    }

    println!(
        "{} equations for {} unknowns",
        summary.equations, summary.unknowns
    );
}
