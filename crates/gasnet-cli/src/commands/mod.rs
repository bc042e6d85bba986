pub mod compare;
pub mod optimize;
pub mod scenarios;
pub mod trace;
pub mod validate;

use anyhow::{bail, Result};
use gasnet_core::Network;
use gasnet_io::load_network_from_path;
use std::path::Path;

/// Load a configuration, printing every diagnostic; errors are fatal.
pub fn load_checked(config: &str) -> Result<Network> {
    let result = load_network_from_path(Path::new(config))?;
    for issue in &result.diagnostics.issues {
        eprintln!("{}", issue);
    }
    if !result.is_usable() {
        bail!(
            "configuration '{}' failed validation ({})",
            config,
            result.diagnostics.summary()
        );
    }
    Ok(result.network)
}
