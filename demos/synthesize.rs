use std::path::PathBuf;
use std::time::Instant;

use sound_prompts::{
    batch,
    engines::http::{HttpConfig, HttpEngine},
    tabular::ColumnReader,
    SynthesisEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        eprintln!(
            "Usage: {} <input.csv> <column label> <output folder> [config.json]",
            args[0]
        );
        std::process::exit(2);
    }
    let source = PathBuf::from(&args[1]);
    let column = &args[2];
    let output = PathBuf::from(&args[3]);

    let config = match args.get(4) {
        Some(path) => HttpConfig::from_json_file(&PathBuf::from(path))?,
        None => HttpConfig::default(),
    };

    let mut engine = HttpEngine::new();
    engine.open_with_params(config.engine)?;

    let rows = ColumnReader::open(&source, column)?;
    let label = rows.label().to_string();

    let start = Instant::now();
    let report = batch::synthesize_rows(
        &mut engine,
        rows,
        &output,
        &label,
        config.format,
        Some(config.request),
    )?;
    println!(
        "Synthesized {} messages ({} chars, {} skipped) in {:.2?}",
        report.synthesized,
        report.characters,
        report.skipped,
        start.elapsed()
    );

    engine.close();
    Ok(())
}
