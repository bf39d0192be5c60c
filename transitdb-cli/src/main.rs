//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = transitdb_cli::run() {
        eprintln!("transitdb: {err}");
        std::process::exit(1);
    }
}
