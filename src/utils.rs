// SPDX-FileCopyrightText: © 2025 Claudio Cicconetti <c.cicconetti@iit.cnr.it>
// SPDX-License-Identifier: MIT

use std::io::Write;

/// Create the parent directory of `full_path`, if needed.
pub fn create_parent_dir(full_path: &str) -> anyhow::Result<()> {
    if let Some(parent_path) = std::path::Path::new(full_path).parent() {
        if parent_path.as_os_str().is_empty() {
            return Ok(());
        }
        if parent_path.exists() {
            if !parent_path.is_dir() {
                anyhow::bail!(
                    "parent exists but is not a directory: {}",
                    parent_path.to_string_lossy()
                );
            }
        } else {
            std::fs::create_dir_all(parent_path)?;
        }
    }
    Ok(())
}

/// Write `content` to the file `filename` in `path`, which is a prefix
/// (e.g., "data/") that may be empty. Existing files are overwritten.
pub fn save_to_file(path: &str, filename: &str, content: &str) -> anyhow::Result<String> {
    let full_path = format!("{}{}", path, filename);
    create_parent_dir(&full_path)?;
    let mut f = std::fs::OpenOptions::new()
        .write(true)
        .append(false)
        .create(true)
        .truncate(true)
        .open(&full_path)?;
    writeln!(&mut f, "{}", content)?;
    Ok(full_path)
}
