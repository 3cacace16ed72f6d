// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External watertightness repair.
//!
//! The repair tool is an opaque binary invoked as
//! `<binary> <input> -o <output>`. It runs once, synchronously; any failure
//! is fatal and never retried.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Binary looked up on `PATH` when no explicit path is configured.
pub const DEFAULT_REPAIR_BINARY: &str = "make_watertight";

/// Runs the repair binary on `input`, writing the repaired database to
/// `output`. `input` is left untouched.
pub fn make_watertight(binary: &Path, input: &Path, output: &Path) -> Result<()> {
    tracing::info!(
        binary = %binary.display(),
        input = %input.display(),
        output = %output.display(),
        "Running watertight repair"
    );

    let result = Command::new(binary)
        .arg(input)
        .arg("-o")
        .arg(output)
        .output();

    let out = match result {
        Ok(out) => out,
        Err(e) => {
            return Err(Error::Repair {
                binary: binary.to_path_buf(),
                reason: format!("could not be started: {e}"),
                unrepaired: Some(input.to_path_buf()),
            })
        }
    };

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
            format!("exited with {}", out.status)
        } else {
            format!("exited with {}: {stderr}", out.status)
        };
        return Err(Error::Repair {
            binary: binary.to_path_buf(),
            reason,
            unrepaired: Some(input.to_path_buf()),
        });
    }

    tracing::debug!(output = %output.display(), "Watertight repair finished");
    Ok(())
}

/// Path where the unrepaired database is kept next to `output`:
/// `dir/name.json` becomes `dir/name.unrepaired.json`.
pub fn unrepaired_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dagmc".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{stem}.unrepaired.{}", ext.to_string_lossy()),
        None => format!("{stem}.unrepaired"),
    };
    output.with_file_name(name)
}
