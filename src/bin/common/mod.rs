// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for the CLI.

use nuscenes2mcap::RunReport;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Format a duration in nanoseconds to human-readable string.
pub fn format_duration(nanos: u64) -> String {
    let secs = nanos / 1_000_000_000;
    let millis = (nanos % 1_000_000_000) / 1_000_000;

    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}s", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

/// Format a byte count with a binary unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

/// Print the run report to stdout.
pub fn print_report(report: &RunReport) {
    let elapsed_ns = (report.elapsed_secs * 1e9) as u64;
    println!("Conversion report:");
    println!(
        "  Started:  {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Elapsed:  {}", format_duration(elapsed_ns));
    println!("  Scenes converted: {}", report.scenes_converted());
    println!("  Scenes failed:    {}", report.scenes_failed());
    println!("  Files written:    {}", report.files_written());
    println!("  Files skipped:    {}", report.files_skipped());
    println!("  Messages:         {}", report.messages());

    for scene in &report.scenes {
        let size = std::fs::metadata(&scene.path).map(|m| m.len()).unwrap_or(0);
        println!(
            "  {:<12} -> {} ({}, {} messages)",
            scene.scene_name,
            scene.path.display(),
            format_bytes(size),
            scene.messages
        );
    }
    for failure in &report.failures {
        println!("  FAILED {}: {}", failure.scene, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(500_000_000), "500ms");
        assert_eq!(format_duration(1_500_000_000), "1.500s");
        assert_eq!(format_duration(90_000_000_000), "1m 30s");
        assert_eq!(format_duration(3_600_000_000_000), "1h 0m");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
    }
}
