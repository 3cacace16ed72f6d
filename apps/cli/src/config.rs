// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tool configuration loaded from environment variables.

use std::path::PathBuf;

use dagmc_lite_processing::DEFAULT_REPAIR_BINARY;

/// Log filter used when neither `RUST_LOG` nor `DAGMC_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,dagmc_lite_processing=debug,dagmc_lite_geometry=info";

/// Environment-backed defaults for the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repair binary used by `--make-watertight` without a value.
    pub repair_binary: PathBuf,
    /// Tracing filter directives.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            repair_binary: lookup("DAGMC_MAKE_WATERTIGHT")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPAIR_BINARY)),
            // RUST_LOG wins over the tool-specific variable.
            log_filter: lookup("RUST_LOG")
                .or_else(|| lookup("DAGMC_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
