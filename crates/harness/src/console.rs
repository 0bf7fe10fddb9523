// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! ANSI coloring for the console report.

use std::fmt;

const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

/// Whether report text is wrapped in ANSI color codes.
///
/// Passed explicitly to everything that prints, so tests can assert on
/// plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub const fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Wraps `text` in the success color.
    pub fn success(self, text: &str) -> Painted<'_> {
        Painted {
            text,
            color: self.enabled.then_some(GREEN),
        }
    }

    /// Wraps `text` in the error color.
    pub fn error(self, text: &str) -> Painted<'_> {
        Painted {
            text,
            color: self.enabled.then_some(RED),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Text with an optional color, rendered through `Display`.
#[derive(Debug, Clone, Copy)]
pub struct Painted<'a> {
    text: &'a str,
    color: Option<&'static str>,
}

impl fmt::Display for Painted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{color}{}{RESET}", self.text),
            None => f.write_str(self.text),
        }
    }
}
