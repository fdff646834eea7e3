//! # Island Engine Entry Point
//!
//! Runs the headless island demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(err) = island_engine::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
