//! # Channel Codec
//!
//! Every track is stored as one or more channels. Transform tracks hold a rotation
//! (4 components), a translation (3) and a scale (3) channel; scalar tracks hold a single
//! channel with one component per float.
//!
//! A channel starts with a 4 byte header: kind, bit rate, component count and a zero
//! byte. What follows depends on the kind:
//!
//! - [`ChannelKind::Default`]: nothing, every sample equals the channel default.
//! - [`ChannelKind::Constant`]: one `f32` per component.
//! - [`ChannelKind::Animated`]: per component minimum and extent (`f32` each), then either
//!   every sample as raw `f32` ([`RAW_BIT_RATE`]) or every component quantized to
//!   `bit_rate` bits and bit packed.
//!
//! [`quantize`] and [`dequantize`] are the only place values cross between floats and
//! quantized integers, so the compressor's error estimate matches what the decoder
//! reconstructs exactly.

use crate::blob::BlobError;

pub mod bits;

use bits::{packed_size, read_bits, read_f32_le, BitWriter};

/// Size of a channel header in bytes.
pub const CHANNEL_HEADER_SIZE: usize = 4;

/// Lowest bit rate used for quantized channels.
pub const MIN_BIT_RATE: u8 = 3;

/// Highest bit rate used for quantized channels.
pub const MAX_BIT_RATE: u8 = 19;

/// Bit rate marking channels stored as raw `f32` samples.
pub const RAW_BIT_RATE: u8 = 32;

/// How a channel is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelKind {
    /// Every sample equals the channel default.
    Default = 0,
    /// Every sample equals one stored value.
    Constant = 1,
    /// Samples vary over time.
    Animated = 2,
}

impl ChannelKind {
    /// Convert from u8 value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Default),
            1 => Some(Self::Constant),
            2 => Some(Self::Animated),
            _ => None,
        }
    }
}

/// The storage chosen for one channel by the compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFormat {
    /// Stored as [`ChannelKind::Default`].
    Default,
    /// Stored as [`ChannelKind::Constant`] holding the first sample.
    Constant,
    /// Stored as [`ChannelKind::Animated`] at the given bit rate.
    Animated {
        /// [`MIN_BIT_RATE`]..=[`MAX_BIT_RATE`], or [`RAW_BIT_RATE`]
        bit_rate: u8,
    },
}

impl ChannelFormat {
    /// Returns `true` for animated channels stored below [`RAW_BIT_RATE`].
    #[inline]
    pub fn is_quantized(self) -> bool {
        matches!(self, Self::Animated { bit_rate } if bit_rate != RAW_BIT_RATE)
    }
}

/// Returns the bit rate tried after `bit_rate`, [`None`] once samples are raw.
#[inline]
pub fn next_bit_rate(bit_rate: u8) -> Option<u8> {
    match bit_rate {
        RAW_BIT_RATE => None,
        MAX_BIT_RATE => Some(RAW_BIT_RATE),
        rate => Some(rate + 1),
    }
}

/// Returns `true` if `bit_rate` may appear in an animated channel header.
#[inline]
pub fn is_valid_bit_rate(bit_rate: u8) -> bool {
    (MIN_BIT_RATE..=MAX_BIT_RATE).contains(&bit_rate) || bit_rate == RAW_BIT_RATE
}

/// Largest quantized value at `bit_rate` bits.
#[inline]
fn max_quantized(bit_rate: u8) -> u32 {
    (1u32 << bit_rate) - 1
}

/// Quantizes `value` within `[min, min + extent]` to `bit_rate` bits.
#[inline]
pub fn quantize(value: f32, min: f32, extent: f32, bit_rate: u8) -> u32 {
    if extent <= 0.0 {
        return 0;
    }
    let normalized = ((value - min) / extent).clamp(0.0, 1.0);
    (normalized * max_quantized(bit_rate) as f32).round() as u32
}

/// Reconstructs a value quantized by [`quantize`].
#[inline]
pub fn dequantize(quantized: u32, min: f32, extent: f32, bit_rate: u8) -> f32 {
    let normalized = quantized as f32 / max_quantized(bit_rate) as f32;
    min + normalized * extent
}

/// Per component minimum and extent of a set of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeReduction {
    min: [f32; 4],
    extent: [f32; 4],
    num_components: usize,
}

impl RangeReduction {
    /// Computes the range of `samples`, laid out as `num_samples * num_components` floats.
    pub fn from_samples(samples: &[f32], num_components: usize) -> Self {
        let mut min = [f32::MAX; 4];
        let mut max = [f32::MIN; 4];
        for sample in samples.chunks_exact(num_components) {
            for (component, &value) in sample.iter().enumerate() {
                min[component] = min[component].min(value);
                max[component] = max[component].max(value);
            }
        }

        let mut extent = [0.0; 4];
        for component in 0..num_components {
            extent[component] = max[component] - min[component];
        }
        for component in num_components..4 {
            min[component] = 0.0;
        }

        Self {
            min,
            extent,
            num_components,
        }
    }

    /// Quantizes then reconstructs `value` for `component`.
    #[inline]
    pub fn round_trip(&self, value: f32, component: usize, bit_rate: u8) -> f32 {
        let (min, extent) = (self.min[component], self.extent[component]);
        dequantize(quantize(value, min, extent, bit_rate), min, extent, bit_rate)
    }
}

/// Reconstructs every sample of a channel the way the decoder will see it.
///
/// `samples` holds `num_samples * num_components` floats; `defaults` holds one value per
/// component. The result has the same layout as `samples`.
pub fn reconstruct_channel(
    format: ChannelFormat,
    samples: &[f32],
    num_components: usize,
    defaults: &[f32],
    out: &mut Vec<f32>,
) {
    out.clear();
    match format {
        ChannelFormat::Default => {
            for _ in samples.chunks_exact(num_components) {
                out.extend_from_slice(defaults);
            }
        }
        ChannelFormat::Constant => {
            let first = &samples[..num_components];
            for _ in samples.chunks_exact(num_components) {
                out.extend_from_slice(first);
            }
        }
        ChannelFormat::Animated {
            bit_rate: RAW_BIT_RATE,
        } => out.extend_from_slice(samples),
        ChannelFormat::Animated { bit_rate } => {
            let range = RangeReduction::from_samples(samples, num_components);
            for sample in samples.chunks_exact(num_components) {
                for (component, &value) in sample.iter().enumerate() {
                    out.push(range.round_trip(value, component, bit_rate));
                }
            }
        }
    }
}

/// Appends one encoded channel to `out`.
pub fn encode_channel(
    format: ChannelFormat,
    samples: &[f32],
    num_components: usize,
    out: &mut Vec<u8>,
) {
    let (kind, bit_rate) = match format {
        ChannelFormat::Default => (ChannelKind::Default, 0),
        ChannelFormat::Constant => (ChannelKind::Constant, 0),
        ChannelFormat::Animated { bit_rate } => (ChannelKind::Animated, bit_rate),
    };
    out.extend_from_slice(&[kind as u8, bit_rate, num_components as u8, 0]);

    match format {
        ChannelFormat::Default => {}
        ChannelFormat::Constant => {
            for &value in &samples[..num_components] {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        ChannelFormat::Animated { bit_rate } => {
            let range = RangeReduction::from_samples(samples, num_components);
            for component in 0..num_components {
                out.extend_from_slice(&range.min[component].to_le_bytes());
            }
            for component in 0..num_components {
                out.extend_from_slice(&range.extent[component].to_le_bytes());
            }

            if bit_rate == RAW_BIT_RATE {
                for &value in samples {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            } else {
                let mut writer = BitWriter::new();
                for sample in samples.chunks_exact(num_components) {
                    for (component, &value) in sample.iter().enumerate() {
                        let quantized = quantize(
                            value,
                            range.min[component],
                            range.extent[component],
                            bit_rate,
                        );
                        writer.push(quantized, bit_rate);
                    }
                }
                writer.finish_into(out);
            }
        }
    }
}

/// A parsed channel borrowing its data from a blob body.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a> {
    kind: ChannelKind,
    bit_rate: u8,
    num_components: usize,
    values: &'a [u8],
    extents: &'a [u8],
    samples: &'a [u8],
}

impl<'a> ChannelView<'a> {
    /// Parses the channel starting at `*offset` in `body` and advances `offset` past it.
    ///
    /// # Errors
    ///
    /// [`BlobError::MalformedBody`] if the channel header is invalid, holds a component
    /// count other than `num_components` or the data runs past the body.
    pub fn parse(
        body: &'a [u8],
        offset: &mut usize,
        num_components: usize,
        num_samples: usize,
    ) -> Result<Self, BlobError> {
        let header = take(body, offset, CHANNEL_HEADER_SIZE)?;
        let kind = ChannelKind::from_u8(header[0])
            .ok_or(BlobError::MalformedBody("unknown channel kind"))?;
        let bit_rate = header[1];
        if header[2] as usize != num_components {
            return Err(BlobError::MalformedBody("channel component count mismatch"));
        }
        if header[3] != 0 {
            return Err(BlobError::MalformedBody("channel reserved byte set"));
        }

        let component_bytes = num_components * 4;
        let empty: &'a [u8] = &[];
        match kind {
            ChannelKind::Default | ChannelKind::Constant if bit_rate != 0 => {
                Err(BlobError::MalformedBody("bit rate on a non animated channel"))
            }
            ChannelKind::Default => Ok(Self {
                kind,
                bit_rate,
                num_components,
                values: empty,
                extents: empty,
                samples: empty,
            }),
            ChannelKind::Constant => Ok(Self {
                kind,
                bit_rate,
                num_components,
                values: take(body, offset, component_bytes)?,
                extents: empty,
                samples: empty,
            }),
            ChannelKind::Animated => {
                if !is_valid_bit_rate(bit_rate) {
                    return Err(BlobError::MalformedBody("invalid bit rate"));
                }
                let values = take(body, offset, component_bytes)?;
                let extents = take(body, offset, component_bytes)?;

                let num_values = num_samples
                    .checked_mul(num_components)
                    .ok_or(BlobError::MalformedBody("sample count overflow"))?;
                let sample_bytes = if bit_rate == RAW_BIT_RATE {
                    num_values.checked_mul(4)
                } else {
                    packed_size(num_values, bit_rate)
                }
                .ok_or(BlobError::MalformedBody("sample count overflow"))?;

                Ok(Self {
                    kind,
                    bit_rate,
                    num_components,
                    values,
                    extents,
                    samples: take(body, offset, sample_bytes)?,
                })
            }
        }
    }

    /// How the channel is stored.
    #[inline]
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Returns `true` if samples are quantized below [`RAW_BIT_RATE`].
    #[inline]
    pub fn is_quantized(&self) -> bool {
        self.kind == ChannelKind::Animated && self.bit_rate != RAW_BIT_RATE
    }

    /// Decodes the sample at `sample_index` into `out`.
    ///
    /// `defaults` and `out` hold one value per component. `sample_index` must be below
    /// the sample count the channel was parsed with.
    pub fn decode_sample(&self, sample_index: usize, defaults: &[f32], out: &mut [f32]) {
        let num_components = self.num_components;
        match self.kind {
            ChannelKind::Default => out[..num_components].copy_from_slice(&defaults[..num_components]),
            ChannelKind::Constant => {
                for (component, value) in out[..num_components].iter_mut().enumerate() {
                    *value = read_f32_le(self.values, component * 4);
                }
            }
            ChannelKind::Animated => {
                let first_value = sample_index * num_components;
                for (component, value) in out[..num_components].iter_mut().enumerate() {
                    let value_index = first_value + component;
                    *value = if self.bit_rate == RAW_BIT_RATE {
                        read_f32_le(self.samples, value_index * 4)
                    } else {
                        let quantized = read_bits(
                            self.samples,
                            value_index * self.bit_rate as usize,
                            self.bit_rate,
                        );
                        dequantize(
                            quantized,
                            read_f32_le(self.values, component * 4),
                            read_f32_le(self.extents, component * 4),
                            self.bit_rate,
                        )
                    };
                }
            }
        }
    }
}

/// Splits `len` bytes off `body` at `*offset`.
fn take<'a>(body: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8], BlobError> {
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= body.len())
        .ok_or(BlobError::MalformedBody("channel data runs past the blob"))?;
    let slice = &body[*offset..end];
    *offset = end;
    Ok(slice)
}
