use std::path::PathBuf;
use std::time::Instant;

use sound_prompts::{tabular, transcript};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Usage: {} <input.txt> <output.csv> [column label]", args[0]);
        std::process::exit(2);
    }
    let source = PathBuf::from(&args[1]);
    let destination = PathBuf::from(&args[2]);
    let label = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(tabular::DEFAULT_LABEL);

    let start = Instant::now();
    let parsed = transcript::parse_file(&source)?;
    println!(
        "Processed {} lines, ignored {} lines, {} distinct results parsed in {:.2?}",
        parsed.stats.processed,
        parsed.stats.ignored,
        parsed.stats.distinct,
        start.elapsed()
    );
    if parsed.stats.duplicates > 0 {
        println!("{} duplicate keys were overwritten", parsed.stats.duplicates);
    }

    tabular::write_table_file(&destination, label, &parsed.table)?;
    println!("Saved to {}", destination.display());
    Ok(())
}
