// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Golden comparison: element-wise difference count and signal-to-noise ratio.
//!
//! Raw output bytes are reinterpreted according to the [`ElementType`] the
//! backend reports for the buffer, decoded in native byte order. Both metrics
//! are accumulated in `f64` whatever the element type, so integer outputs
//! never wrap when subtracted.
//!
//! # Metrics
//!
//! For golden values `g[k]` and live values `l[k]`:
//!
//! - **difference count**: number of `k` with `|g[k] - l[k]| > threshold`.
//! - **SNR**: `10 * log10(Σ g[k]² / Σ (l[k] - g[k])²)`, or `+inf` when the
//!   noise sum is exactly zero.
//!
//! The threshold is absolute, so scaling both buffers by the same factor
//! changes the difference count. The SNR is unaffected by such scaling.
//!
//! Bytes past the last whole element are ignored.

use backend_runtime::ElementType;
use half::f16;

/// A fixed-width numeric element that can appear in a golden file.
pub trait GoldenElement: Copy {
    /// Width of one element in bytes.
    const SIZE: usize;
    /// Backend tag this element type corresponds to.
    const ELEMENT_TYPE: ElementType;

    /// Decodes one element from exactly [`SIZE`](Self::SIZE) native-endian bytes.
    fn decode(bytes: &[u8]) -> Self;

    fn to_f64(self) -> f64;
}

macro_rules! impl_golden_element {
    ($($t:ty => $tag:ident),* $(,)?) => {
        $(
            impl GoldenElement for $t {
                const SIZE: usize = std::mem::size_of::<$t>();
                const ELEMENT_TYPE: ElementType = ElementType::$tag;

                fn decode(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_ne_bytes(raw)
                }

                fn to_f64(self) -> f64 {
                    f64::from(self)
                }
            }
        )*
    };
}

impl_golden_element! {
    f32 => Float32,
    f16 => Float16,
    f64 => Float64,
    u8 => UInt8,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    u32 => UInt32,
}

/// Running sums for one buffer comparison.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    elements: usize,
    diff_count: usize,
    signal: f64,
    noise: f64,
}

impl Accumulator {
    fn push(&mut self, golden: f64, live: f64, threshold: f64) {
        let delta = live - golden;
        if delta.abs() > threshold {
            self.diff_count += 1;
        }
        self.signal += golden * golden;
        self.noise += delta * delta;
        self.elements += 1;
    }

    fn snr(&self) -> f64 {
        if self.noise == 0.0 {
            f64::INFINITY
        } else {
            10.0 * (self.signal / self.noise).log10()
        }
    }
}

/// Number of positions where golden and live differ by more than `threshold`.
///
/// Only the common prefix of the two slices is compared.
pub fn diff_count<T: GoldenElement>(golden: &[T], live: &[T], threshold: f64) -> usize {
    accumulate(golden.iter().copied().zip(live.iter().copied()), threshold).diff_count
}

/// Signal-to-noise ratio of `live` against `golden`, in decibels.
///
/// Returns `+inf` when the two are identical.
pub fn snr<T: GoldenElement>(golden: &[T], live: &[T]) -> f64 {
    accumulate(golden.iter().copied().zip(live.iter().copied()), 0.0).snr()
}

fn accumulate<T: GoldenElement>(
    pairs: impl Iterator<Item = (T, T)>,
    threshold: f64,
) -> Accumulator {
    let mut acc = Accumulator::default();
    for (g, l) in pairs {
        acc.push(g.to_f64(), l.to_f64(), threshold);
    }
    acc
}

/// Result of comparing one output buffer with its golden file.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComparisonOutcome {
    pub element_type: ElementType,
    /// Whole elements compared.
    pub elements: usize,
    pub diff_count: usize,
    pub snr: f64,
}

impl ComparisonOutcome {
    /// `true` when no element differed by more than the threshold.
    pub fn is_match(&self) -> bool {
        self.diff_count == 0
    }
}

/// Compares raw bytes of one element type, without decoding into a temporary.
pub fn compare_typed<T: GoldenElement>(
    golden: &[u8],
    live: &[u8],
    threshold: f64,
) -> ComparisonOutcome {
    let pairs = golden
        .chunks_exact(T::SIZE)
        .zip(live.chunks_exact(T::SIZE))
        .map(|(g, l)| (T::decode(g), T::decode(l)));
    let acc = accumulate(pairs, threshold);
    ComparisonOutcome {
        element_type: T::ELEMENT_TYPE,
        elements: acc.elements,
        diff_count: acc.diff_count,
        snr: acc.snr(),
    }
}

/// Compares `live` against `golden`, both interpreted as `element_type`.
///
/// Returns `None` when the element type has no numeric interpretation here
/// (64-bit integers, booleans, strings, complex numbers and opaque handles).
pub fn compare_bytes(
    element_type: ElementType,
    golden: &[u8],
    live: &[u8],
    threshold: f32,
) -> Option<ComparisonOutcome> {
    let threshold = f64::from(threshold);
    let outcome = match element_type {
        ElementType::Float32 => compare_typed::<f32>(golden, live, threshold),
        ElementType::Float16 => compare_typed::<f16>(golden, live, threshold),
        ElementType::Float64 => compare_typed::<f64>(golden, live, threshold),
        ElementType::UInt8 => compare_typed::<u8>(golden, live, threshold),
        ElementType::Int8 => compare_typed::<i8>(golden, live, threshold),
        ElementType::Int16 => compare_typed::<i16>(golden, live, threshold),
        ElementType::Int32 => compare_typed::<i32>(golden, live, threshold),
        ElementType::UInt32 => compare_typed::<u32>(golden, live, threshold),
        _ => return None,
    };
    Some(outcome)
}

/// Whether [`compare_bytes`] can interpret `element_type`.
pub fn is_supported(element_type: ElementType) -> bool {
    compare_bytes(element_type, &[], &[], 0.0).is_some()
}
