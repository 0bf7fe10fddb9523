// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Buffer element type tags.

use std::fmt;

/// How the raw bytes of a backend buffer are to be interpreted.
///
/// The discriminants match the wire tags reported by the backend, so a tag
/// read from a vendor runtime converts with [`ElementType::from_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 32-bit IEEE 754 floating point.
    Float32 = 0,
    /// 16-bit IEEE 754 floating point.
    Float16 = 1,
    /// 32-bit signed integer.
    Int32 = 2,
    /// 8-bit unsigned integer (typically quantised activations).
    UInt8 = 3,
    Int64 = 4,
    /// Variable-length string data; not numerically comparable.
    String = 5,
    Bool = 6,
    Int16 = 7,
    Complex64 = 8,
    Int8 = 9,
    Float64 = 10,
    Complex128 = 11,
    UInt64 = 12,
    /// Opaque resource handle.
    Resource = 13,
    /// Opaque variant payload.
    Variant = 14,
    UInt32 = 15,
}

impl ElementType {
    /// Every tag, in wire order.
    pub const ALL: [ElementType; 16] = [
        ElementType::Float32,
        ElementType::Float16,
        ElementType::Int32,
        ElementType::UInt8,
        ElementType::Int64,
        ElementType::String,
        ElementType::Bool,
        ElementType::Int16,
        ElementType::Complex64,
        ElementType::Int8,
        ElementType::Float64,
        ElementType::Complex128,
        ElementType::UInt64,
        ElementType::Resource,
        ElementType::Variant,
        ElementType::UInt32,
    ];

    /// Converts a raw backend tag. Returns `None` for tags outside the known range.
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Returns the raw backend tag.
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Returns the size of one element in bytes, or `None` for types
    /// without a fixed width.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            ElementType::UInt8 | ElementType::Int8 | ElementType::Bool => Some(1),
            ElementType::Float16 | ElementType::Int16 => Some(2),
            ElementType::Float32 | ElementType::Int32 | ElementType::UInt32 => Some(4),
            ElementType::Float64
            | ElementType::Int64
            | ElementType::UInt64
            | ElementType::Complex64 => Some(8),
            ElementType::Complex128 => Some(16),
            ElementType::String | ElementType::Resource | ElementType::Variant => None,
        }
    }

    /// Returns a human-readable label for this element type.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Float32 => "float32",
            ElementType::Float16 => "float16",
            ElementType::Int32 => "int32",
            ElementType::UInt8 => "uint8",
            ElementType::Int64 => "int64",
            ElementType::String => "string",
            ElementType::Bool => "bool",
            ElementType::Int16 => "int16",
            ElementType::Complex64 => "complex64",
            ElementType::Int8 => "int8",
            ElementType::Float64 => "float64",
            ElementType::Complex128 => "complex128",
            ElementType::UInt64 => "uint64",
            ElementType::Resource => "resource",
            ElementType::Variant => "variant",
            ElementType::UInt32 => "uint32",
        }
    }

    /// Parses a label, accepting both the long (`"float32"`) and short (`"f32"`) spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "f32" => Some(ElementType::Float32),
            "f16" => Some(ElementType::Float16),
            "f64" => Some(ElementType::Float64),
            "u8" => Some(ElementType::UInt8),
            "i8" => Some(ElementType::Int8),
            "i16" => Some(ElementType::Int16),
            "i32" => Some(ElementType::Int32),
            "u32" => Some(ElementType::UInt32),
            "i64" => Some(ElementType::Int64),
            "u64" => Some(ElementType::UInt64),
            other => Self::ALL.iter().copied().find(|t| t.as_str() == other),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
