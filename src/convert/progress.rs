// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Run-wide progress over raw files.

use std::io::IsTerminal as _;

/// Cloneable progress handle shared by all scene workers and decode tasks.
///
/// Draws an `indicatif` bar only when stderr is a terminal. Scenes add their
/// file count when they start, so the length grows as the run proceeds.
#[derive(Debug, Clone)]
pub struct FileProgress {
    inner: Option<indicatif::ProgressBar>,
}

impl FileProgress {
    /// Progress bar on stderr if it is a terminal, hidden otherwise.
    pub fn new() -> Self {
        if !std::io::stderr().is_terminal() {
            return Self::hidden();
        }
        let bar = indicatif::ProgressBar::new(0);
        if let Ok(style) = indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { inner: Some(bar) }
    }

    /// A handle that draws nothing.
    pub fn hidden() -> Self {
        Self { inner: None }
    }

    /// Announce `n` more files to process.
    pub fn add_files(&self, n: u64) {
        if let Some(bar) = &self.inner {
            bar.inc_length(n);
        }
    }

    /// Mark `n` files as processed.
    pub fn inc(&self, n: u64) {
        if let Some(bar) = &self.inner {
            bar.inc(n);
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        if let Some(bar) = &self.inner {
            bar.set_message(msg.into());
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.inner {
            bar.finish_and_clear();
        }
    }
}

impl Default for FileProgress {
    fn default() -> Self {
        Self::hidden()
    }
}
