//! crm-ident command line
//!
//! Loads a graph snapshot into memory and resolves one `(ident, authority)`
//! pair, printing the matches as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use crm_ident::{logging, IdentityResolver, InMemoryGraph, ResolverConfig};
use tracing::info;

/// Command line options
#[derive(Default)]
struct Args {
    graph: Option<PathBuf>,
    config: Option<PathBuf>,
    ident: Option<String>,
    authority: Option<String>,
}

fn print_help() {
    println!("crm-ident - resolve persons by identifier and authority");
    println!();
    println!("USAGE:");
    println!("    crm-ident --graph <FILE> --ident <IDENT> --authority <AUTHORITY> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -g, --graph <FILE>            Graph snapshot (JSON)");
    println!("    -i, --ident <IDENT>           Identifier literal");
    println!("    -a, --authority <AUTHORITY>   Authority code of the assigning agent");
    println!("    -c, --config <FILE>           Resolver config (JSON)");
    println!("    -h, --help                    Print help information");
}

/// Argument following position `i`, unless it is missing or another flag.
fn next_value(args: &[String], i: usize) -> Option<&str> {
    match args.get(i + 1) {
        Some(value) if !value.starts_with('-') => Some(value.as_str()),
        _ => None,
    }
}

fn take_value(args: &[String], i: usize, flag: &str) -> String {
    if let Some(value) = next_value(args, i) {
        value.to_string()
    } else {
        eprintln!("error: {flag} requires a value");
        std::process::exit(1);
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--graph" | "-g" => parsed.graph = Some(PathBuf::from(take_value(&args, i, "--graph"))),
            "--config" | "-c" => {
                parsed.config = Some(PathBuf::from(take_value(&args, i, "--config")));
            }
            "--ident" | "-i" => parsed.ident = Some(take_value(&args, i, "--ident")),
            "--authority" | "-a" => parsed.authority = Some(take_value(&args, i, "--authority")),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
        i += 2;
    }

    parsed
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();
    let (Some(graph_path), Some(ident), Some(authority)) = (args.graph, args.ident, args.authority)
    else {
        eprintln!("error: --graph, --ident and --authority are required");
        print_help();
        std::process::exit(1);
    };

    let config = match args.config {
        Some(path) => ResolverConfig::from_path(path)?,
        None => ResolverConfig::default(),
    };
    logging::init(&config.logging)?;

    let graph = InMemoryGraph::from_json_path(&graph_path)?;
    info!(
        path = %graph_path.display(),
        nodes = graph.node_count()?,
        relationships = graph.relationship_count()?,
        "graph loaded"
    );

    let resolver = IdentityResolver::new(Arc::new(graph), config);
    let matches = resolver.resolve_person_by_identifier(&ident, &authority)?;
    info!(matches = matches.len(), "resolution finished");

    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_next_value_takes_following_argument() {
        let args = argv(&["crm-ident", "--graph", "graph.json"]);
        assert_eq!(next_value(&args, 1), Some("graph.json"));
    }

    #[test]
    fn test_next_value_rejects_flag_or_end() {
        let args = argv(&["crm-ident", "--graph", "--ident", "X"]);
        assert_eq!(next_value(&args, 1), None);
        let args = argv(&["crm-ident", "--authority"]);
        assert_eq!(next_value(&args, 1), None);
    }
}
