//! Common test imports and utilities for the api crate.
//!
//! This module is only available during testing.

pub use rstest::rstest;

/// Host-native bytes of `values`.
pub(crate) fn f64_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

/// Metadata for transform tracks given as `(output_index, parent_index)` pairs.
///
/// Every track uses `precision`, a shell distance of 1 and the engine's default constant
/// thresholds (rotation in degrees).
pub(crate) fn transform_metadata(
    samples_per_track: u32,
    sample_rate: f64,
    tracks: &[(f64, f64)],
    precision: f64,
) -> Vec<u8> {
    let mut fields = vec![
        tracks.len() as f64,
        0.0,
        samples_per_track as f64,
        sample_rate,
    ];
    for &(output_index, parent_index) in tracks {
        fields.extend([
            output_index,
            parent_index,
            precision,
            1.0,
            0.000_03f64.to_degrees(),
            0.001,
            0.000_01,
        ]);
    }
    f64_bytes(&fields)
}

/// Metadata for scalar tracks given as `(output_index, precision)` pairs.
pub(crate) fn scalar_metadata(samples_per_track: u32, sample_rate: f64, tracks: &[(f64, f64)]) -> Vec<u8> {
    let mut fields = vec![
        tracks.len() as f64,
        1.0,
        samples_per_track as f64,
        sample_rate,
    ];
    for &(output_index, precision) in tracks {
        fields.extend([output_index, precision]);
    }
    f64_bytes(&fields)
}

/// A raw transform sample with identity rotation and scale.
pub(crate) fn identity_sample(translation: [f64; 3]) -> [f64; 10] {
    [
        0.0,
        0.0,
        0.0,
        1.0,
        translation[0],
        translation[1],
        translation[2],
        1.0,
        1.0,
        1.0,
    ]
}

/// Track-major raw transform samples.
pub(crate) fn transform_raw(tracks: &[&[[f64; 10]]]) -> Vec<u8> {
    let fields: Vec<f64> = tracks
        .iter()
        .flat_map(|samples| samples.iter().flatten().copied())
        .collect();
    f64_bytes(&fields)
}

/// Heap storage handing out output slices with a known alignment.
pub(crate) struct AlignedOutput {
    storage: Vec<u8>,
    offset: usize,
}

impl AlignedOutput {
    /// Storage for `len` bytes at a 16 byte aligned or deliberately misaligned address.
    pub(crate) fn new(len: usize) -> Self {
        let storage = vec![0u8; len + 32];
        let offset = storage.as_ptr().align_offset(16);
        Self { storage, offset }
    }

    /// `len` bytes starting at a 16 byte aligned address.
    pub(crate) fn aligned(&mut self, len: usize) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + len]
    }

    /// `len` bytes starting one byte past a 16 byte aligned address.
    pub(crate) fn misaligned(&mut self, len: usize) -> &mut [u8] {
        &mut self.storage[self.offset + 1..self.offset + 1 + len]
    }
}
