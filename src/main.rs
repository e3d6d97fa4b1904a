use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

use parity_paths::parser::load_edge_list;
use parity_paths::search::{DEFAULT_MAX_STEPS, SearchConfig, find_shortest_paths};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "parity-paths")]
#[command(about = "Find all shortest-time paths through a parity-constrained graph")]
#[command(version)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Edge-list file with lines like `"AA" -- "BA" [timestep="odd"];`
    graph: PathBuf,
    /// Name of the start node
    #[arg(long, default_value = "AA")]
    from: String,
    /// Name of the destination node
    #[arg(long, default_value = "ZZ")]
    to: String,
    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(long, short = 'j')]
    workers: Option<usize>,
    /// Discard paths taking more steps than this
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u32,
    /// Timeout in seconds for the search
    #[arg(long)]
    timeout: Option<u64>,
    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading graph from {}...", args.graph.display());
    let mut graph = load_edge_list(&args.graph)?;
    println!(
        "Loaded {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let start = graph
        .node_id(&args.from)
        .ok_or_else(|| format!("start node '{}' not found in graph", args.from))?;
    let destination = graph
        .node_id(&args.to)
        .ok_or_else(|| format!("destination node '{}' not found in graph", args.to))?;

    let config = SearchConfig::default()
        .with_workers_option(args.workers)
        .with_max_steps(args.max_steps)
        .with_timeout_option(args.timeout.map(Duration::from_secs));

    println!("Finding shortest paths from {} to {}...", args.from, args.to);
    let result = find_shortest_paths(&mut graph, start, destination, &config)?;

    println!();
    print!("{}", result.display(&graph));

    if args.verbose {
        println!("\nSearch Statistics:");
        for line in result.statistics.format_summary().lines() {
            println!("  {}", line);
        }
    }
    if result.statistics.timed_out {
        eprintln!("Warning: search timed out, result may be incomplete");
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
