use clap::Parser;
use nyc311_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("Failed to start async runtime: {error}");
            process::exit(1);
        }
    };

    if let Err(error) = runtime.block_on(commands::run(args)) {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}
