// shardfs - Tenant-sharded file storage driver
// Copyright (C) 2025 shardfs Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Shared output formatting for CLI commands.
//!
//! Status messages go to stdout except errors, which go to stderr. With
//! `--json`, commands print a single JSON document instead.

use anyhow::Result;
use console::style;
use serde::Serialize;
use shardfs_storage::{Entry, EntryKind};

/// Print a success message with a green checkmark.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message to stderr with a red cross.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print an informational message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").cyan(), msg);
}

/// Print a warning message to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow(), msg);
}

/// Print a detail line with key-value formatting.
pub fn detail(key: &str, value: &str) {
    println!("  {}: {}", key, style(value).cyan());
}

/// Print one directory entry as a listing line.
pub fn entry(entry: &Entry) {
    match entry.kind {
        EntryKind::Folder => println!(
            "{:>10}  {}",
            style("-").dim(),
            style(format!("{}/", entry.name)).blue().bold()
        ),
        EntryKind::File => println!(
            "{:>10}  {}",
            entry.size.map(human_size).unwrap_or_else(|| "?".to_string()),
            entry.name
        ),
    }
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Byte count with a binary unit suffix
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MiB");
    }

    #[test]
    fn test_output_functions_compile() {
        success("done");
        error("failed");
        info("note");
        warning("careful");
        detail("Path", "/docs");
        entry(&Entry::folder("docs"));
        entry(&Entry::file("a.txt").with_size(3));
        entry(&Entry::file("b.txt"));
        json(&Entry::folder("docs")).unwrap();
    }
}
