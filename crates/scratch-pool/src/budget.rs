// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scratch budget configuration and parsing.

use crate::ScratchError;
use std::fmt;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;
const GIB: usize = 1024 * MIB;

/// A ceiling on the number of live scratch bytes.
///
/// # Parsing
/// - `"512M"` / `"512MB"` → 512 × 1024² bytes
/// - `"1G"` / `"1GB"` → 1024³ bytes
/// - `"64K"` / `"64KB"` → 64 × 1024 bytes
/// - `"4096"` / `"4096B"` → raw byte count
///
/// Suffixes are case-insensitive and surrounding whitespace is ignored.
///
/// ```
/// use scratch_pool::ScratchBudget;
///
/// assert_eq!(ScratchBudget::parse("1G").unwrap().as_mb(), 1024);
/// assert_eq!(ScratchBudget::from_mb(2).as_bytes(), 2 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScratchBudget {
    bytes: usize,
}

impl ScratchBudget {
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MIB }
    }

    pub fn from_gb(gb: usize) -> Self {
        Self { bytes: gb * GIB }
    }

    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the budget in megabytes (truncated).
    pub fn as_mb(&self) -> usize {
        self.bytes / MIB
    }

    /// Parses a human-readable budget string.
    pub fn parse(s: &str) -> Result<Self, ScratchError> {
        let invalid = |reason| ScratchError::InvalidBudget {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let upper = trimmed.to_uppercase();
        let digits_end = upper
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(upper.len());
        let (number, suffix) = upper.split_at(digits_end);

        if number.is_empty() {
            return Err(invalid("expected a number followed by an optional K, M or G suffix"));
        }

        let multiplier = match suffix.trim() {
            "" | "B" => 1,
            "K" | "KB" => KIB,
            "M" | "MB" => MIB,
            "G" | "GB" => GIB,
            _ => return Err(invalid("unknown size suffix")),
        };

        let value: usize = number.parse().map_err(|_| invalid("number out of range"))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| invalid("budget overflows usize"))?;

        if bytes == 0 {
            return Err(invalid("budget must be greater than zero"));
        }
        Ok(Self { bytes })
    }
}

impl Default for ScratchBudget {
    fn default() -> Self {
        Self::from_gb(1)
    }
}

impl fmt::Display for ScratchBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes {
            b if b >= GIB && b % GIB == 0 => write!(f, "{} GB", b / GIB),
            b if b >= MIB && b % MIB == 0 => write!(f, "{} MB", b / MIB),
            b if b >= KIB && b % KIB == 0 => write!(f, "{} KB", b / KIB),
            b => write!(f, "{b} B"),
        }
    }
}
