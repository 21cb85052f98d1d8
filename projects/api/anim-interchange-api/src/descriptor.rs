//! # Binary Descriptor Reader
//!
//! The metadata buffer handed over by the host is a flat run of host-native `f64` fields:
//!
//! ```text
//! +---------------------------+  offset 0
//! | track_count               |
//! | sample_kind               |  0 = transform, 1 = scalar, anything else = unknown
//! | samples_per_track         |
//! | sample_rate               |
//! +---------------------------+  offset 32
//! | descriptor 0              |  7 fields (transform) or 2 fields (scalar)
//! | descriptor 1              |
//! | ...                       |
//! +---------------------------+
//! ```
//!
//! Fields are decoded one at a time through a bounds checked cursor. Nothing is ever
//! reinterpreted in place, so the buffer needs no particular alignment.

use anim_interchange_engine::TrackError;

use crate::error::InterchangeError;

/// Size of one field in every host buffer.
pub const FIELD_SIZE: usize = core::mem::size_of::<f64>();

/// Size of the descriptor header at the front of the metadata buffer.
pub const HEADER_SIZE: usize = 4 * FIELD_SIZE;

/// Size of one [`TransformTrackDescriptor`] record.
pub const TRANSFORM_RECORD_SIZE: usize = 7 * FIELD_SIZE;

/// Size of one [`ScalarTrackDescriptor`] record.
pub const SCALAR_RECORD_SIZE: usize = 2 * FIELD_SIZE;

/// Size of one raw transform sample: rotation (4), translation (3), scale (3).
pub const TRANSFORM_SAMPLE_SIZE: usize = 10 * FIELD_SIZE;

/// Size of one raw scalar sample.
pub const SCALAR_SAMPLE_SIZE: usize = FIELD_SIZE;

/// Size of the [`ErrorRecord`] written back into the metadata buffer.
pub const ERROR_RECORD_SIZE: usize = 3 * FIELD_SIZE;

/// Kind of samples described by a metadata buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleKind {
    /// Rotation, translation and scale per sample.
    Transform,
    /// One float per sample.
    Scalar,
    /// Any other value; carries the raw field.
    Unknown(f64),
}

impl SampleKind {
    /// Interprets the raw `sample_kind` header field.
    pub fn from_raw(value: f64) -> Self {
        if value == 0.0 {
            Self::Transform
        } else if value == 1.0 {
            Self::Scalar
        } else {
            Self::Unknown(value)
        }
    }

    /// Size of one descriptor record, or [`None`] for unknown kinds.
    pub fn record_size(self) -> Option<usize> {
        match self {
            Self::Transform => Some(TRANSFORM_RECORD_SIZE),
            Self::Scalar => Some(SCALAR_RECORD_SIZE),
            Self::Unknown(_) => None,
        }
    }

    /// Size of one raw sample, or [`None`] for unknown kinds.
    pub fn sample_size(self) -> Option<usize> {
        match self {
            Self::Transform => Some(TRANSFORM_SAMPLE_SIZE),
            Self::Scalar => Some(SCALAR_SAMPLE_SIZE),
            Self::Unknown(_) => None,
        }
    }
}

/// The four fields at the front of every metadata buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorHeader {
    /// Number of descriptor records and tracks.
    pub track_count: u32,
    /// Kind of the raw samples.
    pub sample_kind: SampleKind,
    /// Number of samples in every track.
    pub samples_per_track: u32,
    /// Samples per second.
    pub sample_rate: f32,
}

impl DescriptorHeader {
    /// Reads the header from the front of `metadata`.
    ///
    /// # Errors
    ///
    /// - [`InterchangeError::InvalidMetadataSize`] if `metadata` is shorter than the header
    /// - [`InterchangeError::UnsupportedSampleKind`] if the sample kind is not recognized
    /// - [`InterchangeError::MalformedDescriptor`] if a count is not a whole number that
    ///   fits in a `u32`
    pub fn read(metadata: &[u8]) -> Result<Self, InterchangeError> {
        if metadata.len() < HEADER_SIZE {
            return Err(InterchangeError::InvalidMetadataSize {
                expected: HEADER_SIZE,
                actual: metadata.len(),
            });
        }

        let mut cursor = FieldCursor::new(metadata, 0);
        let track_count = cursor.read_f64()?;
        let sample_kind = SampleKind::from_raw(cursor.read_f64()?);
        let samples_per_track = cursor.read_f64()?;
        let sample_rate = cursor.read_f64()?;

        if let SampleKind::Unknown(value) = sample_kind {
            return Err(InterchangeError::UnsupportedSampleKind(value));
        }

        Ok(Self {
            track_count: read_count(track_count, "track count")?,
            sample_kind,
            samples_per_track: read_count(samples_per_track, "samples per track")?,
            sample_rate: sample_rate as f32,
        })
    }

    /// Exact metadata size this header describes.
    pub fn expected_metadata_size(&self) -> Option<usize> {
        expected_metadata_size(self.sample_kind, self.track_count)
    }

    /// Minimum raw sample buffer size this header describes.
    pub fn expected_raw_data_size(&self) -> Option<usize> {
        expected_raw_data_size(self.sample_kind, self.track_count, self.samples_per_track)
    }
}

/// Size of a metadata buffer holding `track_count` records of `kind`.
///
/// Returns [`None`] for unknown kinds or if the size overflows.
pub fn expected_metadata_size(kind: SampleKind, track_count: u32) -> Option<usize> {
    kind.record_size()?
        .checked_mul(track_count as usize)?
        .checked_add(HEADER_SIZE)
}

/// Size of a raw sample buffer holding `track_count` tracks of `samples_per_track` samples.
///
/// Returns [`None`] for unknown kinds or if the size overflows.
pub fn expected_raw_data_size(
    kind: SampleKind,
    track_count: u32,
    samples_per_track: u32,
) -> Option<usize> {
    kind.sample_size()?
        .checked_mul(track_count as usize)?
        .checked_mul(samples_per_track as usize)
}

/// Per track settings of a transform track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformTrackDescriptor {
    /// Position of the track in the compressed output, [`None`] to keep its own index.
    pub output_index: Option<u32>,
    /// Parent bone, [`None`] for roots.
    pub parent_index: Option<u32>,
    /// Largest allowed object space error.
    pub precision: f32,
    /// Distance of the virtual vertices used to measure error on this bone.
    pub shell_distance: f32,
    /// Angle in degrees below which rotations are treated as constant.
    pub constant_rotation_threshold_angle: f32,
    /// Distance below which translations are treated as constant.
    pub constant_translation_threshold: f32,
    /// Distance below which scales are treated as constant.
    pub constant_scale_threshold: f32,
}

/// Per track settings of a scalar track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarTrackDescriptor {
    /// Position of the track in the compressed output, [`None`] to keep its own index.
    pub output_index: Option<u32>,
    /// Largest allowed absolute error.
    pub precision: f32,
}

/// Descriptor records decoded from a metadata buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackDescriptors {
    /// One record per transform track.
    Transform(Vec<TransformTrackDescriptor>),
    /// One record per scalar track.
    Scalar(Vec<ScalarTrackDescriptor>),
}

impl TrackDescriptors {
    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::Transform(records) => records.len(),
            Self::Scalar(records) => records.len(),
        }
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads every descriptor record following `header`.
///
/// The metadata buffer must be exactly as large as the header implies. Index fields are
/// bounds checked against the track count here, before anything narrows them.
///
/// # Errors
///
/// - [`InterchangeError::UnsupportedSampleKind`] for unknown kinds
/// - [`InterchangeError::InvalidMetadataSize`] if the size does not match exactly
/// - [`InterchangeError::MalformedDescriptor`] for a NaN index field
/// - [`InterchangeError::IndexOutOfRange`] for an index field not below the track count
pub fn read_descriptors(
    metadata: &[u8],
    header: &DescriptorHeader,
) -> Result<TrackDescriptors, InterchangeError> {
    if let SampleKind::Unknown(value) = header.sample_kind {
        return Err(InterchangeError::UnsupportedSampleKind(value));
    }

    let expected = header
        .expected_metadata_size()
        .ok_or(InterchangeError::InvalidMetadataSize {
            expected: usize::MAX,
            actual: metadata.len(),
        })?;
    if metadata.len() != expected {
        return Err(InterchangeError::InvalidMetadataSize {
            expected,
            actual: metadata.len(),
        });
    }

    let count = header.track_count;
    let mut cursor = FieldCursor::new(metadata, HEADER_SIZE);

    match header.sample_kind {
        SampleKind::Transform => {
            let mut records = Vec::with_capacity(count as usize);
            for _ in 0..count {
                records.push(TransformTrackDescriptor {
                    output_index: read_index(cursor.read_f64()?, count, "output index")?,
                    parent_index: read_index(cursor.read_f64()?, count, "parent index")?,
                    precision: cursor.read_f64()? as f32,
                    shell_distance: cursor.read_f64()? as f32,
                    constant_rotation_threshold_angle: cursor.read_f64()? as f32,
                    constant_translation_threshold: cursor.read_f64()? as f32,
                    constant_scale_threshold: cursor.read_f64()? as f32,
                });
            }
            Ok(TrackDescriptors::Transform(records))
        }
        SampleKind::Scalar => {
            let mut records = Vec::with_capacity(count as usize);
            for _ in 0..count {
                records.push(ScalarTrackDescriptor {
                    output_index: read_index(cursor.read_f64()?, count, "output index")?,
                    precision: cursor.read_f64()? as f32,
                });
            }
            Ok(TrackDescriptors::Scalar(records))
        }
        SampleKind::Unknown(value) => Err(InterchangeError::UnsupportedSampleKind(value)),
    }
}

/// Worst case error written back by the error reporting encode path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ErrorRecord {
    /// Input index of the track with the largest error.
    pub track_index: f64,
    /// The largest error measured.
    pub measured_error: f64,
    /// Time in seconds where it was measured.
    pub sample_time: f64,
}

impl From<TrackError> for ErrorRecord {
    fn from(error: TrackError) -> Self {
        Self {
            track_index: error.index as f64,
            measured_error: error.error as f64,
            sample_time: error.sample_time as f64,
        }
    }
}

impl ErrorRecord {
    /// Writes the record over the first [`ERROR_RECORD_SIZE`] bytes of `metadata`.
    ///
    /// # Errors
    ///
    /// [`InterchangeError::BufferTooSmall`] if `metadata` cannot hold the record.
    pub fn write_to(&self, metadata: &mut [u8]) -> Result<(), InterchangeError> {
        let actual = metadata.len();
        let out = metadata
            .get_mut(..ERROR_RECORD_SIZE)
            .ok_or(InterchangeError::BufferTooSmall {
                needed: ERROR_RECORD_SIZE,
                actual,
            })?;
        for (chunk, value) in out
            .chunks_exact_mut(FIELD_SIZE)
            .zip([self.track_index, self.measured_error, self.sample_time])
        {
            chunk.copy_from_slice(&value.to_ne_bytes());
        }
        Ok(())
    }

    /// Reads a record back from the front of `metadata`.
    pub fn read_from(metadata: &[u8]) -> Option<Self> {
        let mut cursor = FieldCursor::new(metadata, 0);
        Some(Self {
            track_index: cursor.read_f64().ok()?,
            measured_error: cursor.read_f64().ok()?,
            sample_time: cursor.read_f64().ok()?,
        })
    }
}

/// Sequential reader of host-native `f64` fields with a bounds check on every read.
#[derive(Debug, Clone)]
pub(crate) struct FieldCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldCursor<'a> {
    pub(crate) fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64, InterchangeError> {
        let bytes = self
            .data
            .get(self.offset..)
            .and_then(|rest| rest.first_chunk::<FIELD_SIZE>())
            .ok_or(InterchangeError::InvalidBuffer("field read past the end of the buffer"))?;
        self.offset += FIELD_SIZE;
        Ok(f64::from_ne_bytes(*bytes))
    }
}

/// Narrows a count field, which must be a whole number in `u32` range.
fn read_count(value: f64, field: &'static str) -> Result<u32, InterchangeError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(InterchangeError::MalformedDescriptor(field))
    }
}

/// Narrows an optional index field. Negative values mean "none".
fn read_index(value: f64, count: u32, field: &'static str) -> Result<Option<u32>, InterchangeError> {
    if value.is_nan() {
        return Err(InterchangeError::MalformedDescriptor(field));
    }
    if value < 0.0 {
        return Ok(None);
    }

    let index = value.trunc();
    if index >= count as f64 {
        return Err(InterchangeError::IndexOutOfRange {
            index: index as u64,
            count,
        });
    }
    Ok(Some(index as u32))
}
