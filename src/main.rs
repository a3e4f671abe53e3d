//! jetpalm: resolve configuration from flags, environment and config file
//!
//! Prints the resolved values; any resolution failure exits with status 1.

use anyhow::Result;

fn main() -> Result<()> {
    jetpalm::cli::run()
}
