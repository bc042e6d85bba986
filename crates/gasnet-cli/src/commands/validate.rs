use std::path::Path;

use anyhow::{bail, Result};
use gasnet_io::load_network_from_path;

pub fn handle(config: &str) -> Result<()> {
    let result = load_network_from_path(Path::new(config))?;
    for issue in &result.diagnostics.issues {
        println!("{}", issue);
    }
    let stats = result.network.stats();
    println!("{}", stats);
    if result.is_usable() {
        println!("configuration is valid ({})", result.diagnostics.summary());
        Ok(())
    } else {
        bail!("configuration is invalid ({})", result.diagnostics.summary())
    }
}
