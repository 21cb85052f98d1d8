//! Output sinks for decoded values.
//!
//! A sink is chosen once per decode call from the blob's track type and the request. It
//! owns the size, alignment and index checks for its output buffer, so the buffer is only
//! ever written after every check has passed.

use anim_interchange_common::{
    is_aligned_for, TrackType, QVVF_ALIGNMENT, QVVF_SIZE, SCALAR_ALIGNMENT, SCALAR_SIZE,
};
use anim_interchange_engine::DecompressionContext;

use crate::error::InterchangeError;

/// What a decode call asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRequest {
    /// Every track, in track order.
    Pose,
    /// A single track.
    Track(u32),
}

/// Element written per track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementKind {
    Transform,
    Scalar,
}

impl ElementKind {
    /// The element for tracks of `track_type`, if this layer decodes it.
    pub(crate) fn for_track_type(track_type: TrackType) -> Option<Self> {
        match track_type {
            TrackType::Qvvf => Some(Self::Transform),
            TrackType::Float1f => Some(Self::Scalar),
            _ => None,
        }
    }

    fn size(self) -> usize {
        match self {
            Self::Transform => QVVF_SIZE,
            Self::Scalar => SCALAR_SIZE,
        }
    }

    fn alignment(self) -> usize {
        match self {
            Self::Transform => QVVF_ALIGNMENT,
            Self::Scalar => SCALAR_ALIGNMENT,
        }
    }
}

/// Destination of decoded values.
#[derive(Debug)]
pub(crate) enum OutputSink<'a> {
    Pose(&'a mut [u8]),
    SingleTransform(&'a mut [u8], usize),
    Scalars(&'a mut [u8]),
    SingleScalar(&'a mut [u8], usize),
}

impl<'a> OutputSink<'a> {
    /// Checks `output` against the request and picks the sink.
    ///
    /// Checks run in order: size, alignment, index.
    pub(crate) fn new(
        element: ElementKind,
        request: DecodeRequest,
        num_tracks: u32,
        output: &'a mut [u8],
    ) -> Result<Self, InterchangeError> {
        let num_elements = match request {
            DecodeRequest::Pose => num_tracks as usize,
            DecodeRequest::Track(_) => 1,
        };
        let needed = element
            .size()
            .checked_mul(num_elements)
            .ok_or(InterchangeError::BufferTooSmall {
                needed: usize::MAX,
                actual: output.len(),
            })?;
        if output.len() < needed {
            return Err(InterchangeError::BufferTooSmall {
                needed,
                actual: output.len(),
            });
        }
        if !is_aligned_for(output, element.alignment()) {
            return Err(InterchangeError::MisalignedOutput {
                alignment: element.alignment(),
            });
        }

        let output = &mut output[..needed];
        Ok(match (element, request) {
            (ElementKind::Transform, DecodeRequest::Pose) => Self::Pose(output),
            (ElementKind::Scalar, DecodeRequest::Pose) => Self::Scalars(output),
            (element, DecodeRequest::Track(index)) => {
                if index >= num_tracks {
                    return Err(InterchangeError::IndexOutOfRange {
                        index: index as u64,
                        count: num_tracks,
                    });
                }
                match element {
                    ElementKind::Transform => Self::SingleTransform(output, index as usize),
                    ElementKind::Scalar => Self::SingleScalar(output, index as usize),
                }
            }
        })
    }

    /// Samples `context` at its current position into the output.
    ///
    /// Every value is sampled before the first byte is written.
    pub(crate) fn write(self, context: &DecompressionContext<'_>) -> Result<(), InterchangeError> {
        match self {
            Self::Pose(output) => {
                let floats = (0..context.num_tracks())
                    .map(|track| transform_floats(context, track))
                    .collect::<Result<Vec<_>, _>>()?;
                write_floats(output, floats.iter().flatten().copied());
            }
            Self::SingleTransform(output, track) => {
                write_floats(output, transform_floats(context, track)?);
            }
            Self::Scalars(output) => {
                let values = (0..context.num_tracks())
                    .map(|track| scalar_value(context, track))
                    .collect::<Result<Vec<_>, _>>()?;
                write_floats(output, values);
            }
            Self::SingleScalar(output, track) => {
                write_floats(output, [scalar_value(context, track)?]);
            }
        }
        Ok(())
    }
}

fn transform_floats(
    context: &DecompressionContext<'_>,
    track: usize,
) -> Result<[f32; 12], InterchangeError> {
    context
        .sample_transform(track)
        .map(|transform| transform.to_layout().to_floats())
        .ok_or(missing_track(context, track))
}

fn scalar_value(context: &DecompressionContext<'_>, track: usize) -> Result<f32, InterchangeError> {
    context
        .sample_scalar(track)
        .map(|value| value.x)
        .ok_or(missing_track(context, track))
}

fn missing_track(context: &DecompressionContext<'_>, track: usize) -> InterchangeError {
    InterchangeError::IndexOutOfRange {
        index: track as u64,
        count: context.num_tracks() as u32,
    }
}

/// Writes host-native floats to consecutive 4 byte slots.
fn write_floats(output: &mut [u8], floats: impl IntoIterator<Item = f32>) {
    for (slot, value) in output.chunks_exact_mut(SCALAR_SIZE).zip(floats) {
        slot.copy_from_slice(&value.to_ne_bytes());
    }
}
