use clap::Parser;
use log::info;
use simple_logger::init_with_level;

use aavar::{run, Args};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = std::time::Instant::now();

    let args = Args::parse();
    init_with_level(args.level)?;

    run(args)?;

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.3?}", elapsed);
    Ok(())
}
