use anyhow::Result;
use clap::Parser;

use stats_scanner::{utils, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    match stats_scanner::run(&args) {
        Ok(rendered) => {
            print!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
