//! # Decompression Dispatcher
//!
//! Every call classifies the blob, validates it and the output buffer, opens a fresh
//! decompression context, seeks and samples. No state survives between calls and the blob
//! is never modified.
//!
//! Checks run in a fixed order and the first failure is reported:
//!
//! 1. blob shorter than a header: [`InterchangeError::InvalidBuffer`]
//! 2. unrecognized tag: [`InterchangeError::CorruptData`]
//! 3. declared size larger than the buffer: [`InterchangeError::InvalidBuffer`]
//! 4. failed hash or header check: [`InterchangeError::CorruptData`]
//! 5. track type other than transforms or single floats: [`InterchangeError::UnsupportedTrackType`]
//! 6. output too small: [`InterchangeError::BufferTooSmall`]
//! 7. output misaligned: [`InterchangeError::MisalignedOutput`]
//! 8. track index out of range: [`InterchangeError::IndexOutOfRange`]
//! 9. context initialization: [`InterchangeError::ContextInitFailed`]
//!
//! The output buffer is only written once all of them have passed.

use anim_interchange_common::SampleRoundingPolicy;
use anim_interchange_engine::blob::HEADER_SIZE;
use anim_interchange_engine::{BlobError, CompressedTracksRef, DecompressionContext};
use tracing::{debug, warn};

use crate::error::InterchangeError;
use crate::sink::{DecodeRequest, ElementKind, OutputSink};

/// Classifies and validates a compressed blob stored at the start of `compressed`.
///
/// Bytes past the blob's declared size are ignored.
///
/// # Errors
///
/// - [`InterchangeError::InvalidBuffer`] if `compressed` is shorter than a header or than
///   the declared blob size
/// - [`InterchangeError::CorruptData`] for an unknown tag or a blob failing its hash or
///   header checks
pub fn validate_blob(compressed: &[u8]) -> Result<CompressedTracksRef<'_>, InterchangeError> {
    if compressed.len() < HEADER_SIZE {
        return Err(InterchangeError::InvalidBuffer(
            "compressed buffer shorter than a blob header",
        ));
    }

    let tracks = CompressedTracksRef::new(compressed).map_err(|error| match error {
        BlobError::SizeExceedsBuffer { .. } => {
            InterchangeError::InvalidBuffer("declared blob size exceeds the buffer")
        }
        error => InterchangeError::CorruptData(error),
    })?;

    tracks.is_valid().map_err(|error| {
        warn!(%error, "compressed blob failed validation");
        InterchangeError::CorruptData(error)
    })?;
    Ok(tracks)
}

/// Decodes every track at `sample_time` into `output`.
///
/// Transforms are written as 48 byte elements (rotation, translation, scale; 16 byte
/// aligned), single floats as 4 byte elements, in track order.
///
/// # Errors
///
/// See the [module documentation](self) for the checks and their order.
pub fn decompress_tracks(
    compressed: &[u8],
    sample_time: f32,
    policy: SampleRoundingPolicy,
    output: &mut [u8],
) -> Result<(), InterchangeError> {
    decompress(compressed, sample_time, policy, DecodeRequest::Pose, output)
}

/// Decodes the track at `track_index` at `sample_time` into `output`.
///
/// # Errors
///
/// See the [module documentation](self) for the checks and their order.
pub fn decompress_track(
    compressed: &[u8],
    sample_time: f32,
    policy: SampleRoundingPolicy,
    track_index: u32,
    output: &mut [u8],
) -> Result<(), InterchangeError> {
    decompress(
        compressed,
        sample_time,
        policy,
        DecodeRequest::Track(track_index),
        output,
    )
}

fn decompress(
    compressed: &[u8],
    sample_time: f32,
    policy: SampleRoundingPolicy,
    request: DecodeRequest,
    output: &mut [u8],
) -> Result<(), InterchangeError> {
    let tracks = validate_blob(compressed)?;
    let track_type = tracks
        .track_type()
        .ok_or(InterchangeError::CorruptData(BlobError::InvalidHeader(
            "unknown track type",
        )))?;
    let element = ElementKind::for_track_type(track_type)
        .ok_or(InterchangeError::UnsupportedTrackType(track_type))?;
    debug!(kind = ?tracks.kind(), ?track_type, ?request, "decoding blob");

    let sink = OutputSink::new(element, request, tracks.num_tracks(), output)?;
    let mut context =
        DecompressionContext::initialize(tracks).map_err(InterchangeError::ContextInitFailed)?;
    context.seek(sample_time, policy);
    sink.write(&context)
}
