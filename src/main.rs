//! Headless runner (default binary).
//!
//! Plays one seeded autoplay session and prints the final report as JSON:
//!
//! ```text
//! driftblocks [--seed N] [--config path] [--ticks N] [--classic]
//! ```

use anyhow::Result;

use driftblocks::run::{parse_run_args, run_session};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let run = parse_run_args(&args)?;
    let report = run_session(&run)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
