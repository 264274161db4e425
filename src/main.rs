use clap::Parser;
use geodata_standardizer::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if let Err(e) = commands::run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
