#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

mod cli;

fn main() {
    env_logger::init();
    if let Err(code) = cli::main() {
        std::process::exit(code);
    }
}
