use std::fs;
use std::process;

use clap::Parser;

use rangereach::{base, loader, query, shared, Report};

#[derive(Parser)]
#[command(about = "2D range-reachability queries over a condensation's spatial index")]
struct Cli {
    /// Path prefix for the graph data files produced by the condensation step
    input_prefix: String,

    /// Path to the query file (one `nid xlo ylo xhi yhi` tuple per line)
    query_file: String,

    /// Use the V-Shared engine (index sharing + bitmap lookup) instead of V-Base
    #[arg(long)]
    pointer: bool,
}

fn run(cli: Cli) -> Result<Report, rangereach::ReachError> {
    let cond = loader::load_condensation(&cli.input_prefix)?;

    let engine = if cli.pointer {
        query::Engine::Shared(shared::build(&cond)?)
    } else {
        query::Engine::Base(base::build(&cond)?)
    };

    let query_text =
        fs::read_to_string(&cli.query_file).map_err(|e| rangereach::ReachError::Io {
            path: cli.query_file.clone(),
            source: e,
        })?;

    let stats = query::run_queries(&cond, &engine, &query_text)?;

    Ok(Report {
        prefix: cli.input_prefix,
        query_file: cli.query_file,
        method: engine.method_name(),
        indexing_time: engine.indexing_time(),
        total_index_bytes: engine.total_index_bytes(),
        num_components: cond.num_components(),
        total_points: engine.total_points(),
        num_queries: stats.num_queries,
        num_true: stats.num_true,
        total_query_time: stats.total_query_time,
    })
}

fn main() {
    // Parsed manually (rather than `Cli::parse()`) so a wrong argument count
    // exits with code 1, matching the original's usage-error contract,
    // instead of clap's default exit code 2.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        use clap::error::ErrorKind;
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        }
    });
    match run(cli) {
        Ok(report) => print!("{}", report),
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            eprintln!();
            process::exit(1);
        }
    }
}
