// CLI entry point: one-shot path query against a map file.
//
// Loads a map in the text format (see `map_text.rs`), finds the cheapest
// path between two cells, and prints the map with the path drawn as `.`
// followed by the path length.
//
// Usage:
//   warren-path <MAP> <FROM> <TO> [OPTIONS]
//     <FROM>, <TO>            Cells as row,col or row,col,layer
//     --config <FILE>         NavConfig JSON (default: built-in defaults)
//
// Logging goes through `tracing`; set `RUST_LOG` (default `warren_nav=info`).

use warren_nav::debug::render_ascii;
use warren_nav::{Coord, MapCache, NavConfig};

struct Args {
    map: String,
    from: Coord,
    to: Coord,
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warren_nav=info")),
        )
        .init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => load_config(path),
        None => NavConfig::default(),
    };

    let mut cache = MapCache::new(config);
    let snapshot = match cache.load_file(&args.map) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Failed to load map: {e}");
            std::process::exit(1);
        }
    };

    for (label, coord) in [("FROM", args.from), ("TO", args.to)] {
        if !snapshot.domain().contains(coord) {
            eprintln!("{label} cell {coord} is outside the map {:?}", snapshot.domain());
            std::process::exit(1);
        }
    }

    let path = snapshot.path(args.from, args.to);
    let cells = path.is_found().then_some(path.cells.as_slice());
    print!("{}", render_ascii(snapshot.diagnostics(), cells));
    if path.is_found() {
        println!("length {:.3} over {} cells", path.length, path.cells.len());
    } else {
        println!("no path");
    }
}

fn load_config(path: &str) -> NavConfig {
    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read config {path}: {e}");
        std::process::exit(1);
    });
    NavConfig::from_json(&text).unwrap_or_else(|e| {
        eprintln!("Bad config {path}: {e}");
        std::process::exit(1);
    })
}

/// Parse `row,col` or `row,col,layer`.
fn parse_coord(text: &str) -> Option<Coord> {
    let parts: Vec<u16> = text
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [row, col] => Some(Coord::flat(*row, *col)),
        [row, col, layer] => Some(Coord::new(*row, *col, *layer)),
        _ => None,
    }
}

fn usage() -> ! {
    eprintln!("usage: warren-path <MAP> <row,col[,layer]> <row,col[,layer]> [--config <FILE>]");
    std::process::exit(2);
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut positional = Vec::new();
    let mut config = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    std::process::exit(1);
                }));
            }
            "--help" | "-h" => usage(),
            other if other.starts_with("--") => {
                eprintln!("Unknown option: {other}");
                usage();
            }
            other => positional.push(other.to_owned()),
        }
        i += 1;
    }

    let [map, from, to] = positional.as_slice() else {
        usage();
    };
    let coord = |text: &str| {
        parse_coord(text).unwrap_or_else(|| {
            eprintln!("Bad cell {text:?}: expected row,col or row,col,layer");
            std::process::exit(1);
        })
    };
    Args {
        map: map.clone(),
        from: coord(from.as_str()),
        to: coord(to.as_str()),
        config,
    }
}
