//! # Compression Dispatcher
//!
//! Reads the metadata and raw sample buffers, builds engine tracks for the declared sample
//! kind and writes the compressed blob into a caller buffer.
//!
//! Three entry points differ only in where results go:
//!
//! - [`compress_into`] reads `raw_data` and writes the blob into a separate `output`.
//! - [`compress_in_place`] reads `raw_data` completely into owned tracks, then overwrites it
//!   with the blob.
//! - [`compress_with_error_report`] does the same, then measures the blob against the
//!   uncompressed tracks and overwrites the front of `metadata` with an [`ErrorRecord`].
//!
//! The blob lives in memory from the caller's [`ScratchAllocator`] and is released before
//! every return, whether the call succeeds or not.

use anim_interchange_common::ScratchAllocator;
use anim_interchange_engine::{
    calculate_clip_error, calculate_track_list_error, compress_clip, compress_track_list,
    AnimationClip, CompressedTracks, CompressedTracksRef, CompressionSettings, TrackError,
    TrackList,
};
use tracing::{debug, warn};

use crate::builder::{build_clip, build_track_list};
use crate::descriptor::{read_descriptors, DescriptorHeader, ErrorRecord, TrackDescriptors};
use crate::error::InterchangeError;
use crate::settings::InterchangeSettings;

/// Result of [`compress_with_error_report`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressReport {
    /// Size of the blob written into the raw data buffer.
    pub bytes_written: usize,
    /// Worst case error of the blob against the uncompressed tracks.
    pub error: TrackError,
}

/// Uncompressed tracks built from the host buffers, with the engine settings for them.
#[derive(Debug, Clone)]
enum SourceTracks {
    Clip(AnimationClip, CompressionSettings),
    List(TrackList, CompressionSettings),
}

impl SourceTracks {
    fn read(
        metadata: &[u8],
        raw_data: &[u8],
        settings: &InterchangeSettings,
    ) -> Result<Self, InterchangeError> {
        let header = DescriptorHeader::read(metadata)?;
        let descriptors = read_descriptors(metadata, &header)?;
        debug!(
            tracks = header.track_count,
            samples = header.samples_per_track,
            kind = ?header.sample_kind,
            "read track descriptors"
        );

        Ok(match descriptors {
            TrackDescriptors::Transform(records) => Self::Clip(
                build_clip(&header, &records, raw_data)?,
                settings.clip_settings(records.first()),
            ),
            TrackDescriptors::Scalar(records) => Self::List(
                build_track_list(&header, &records, raw_data)?,
                settings.track_list_settings(),
            ),
        })
    }

    fn compress(
        &self,
        allocator: &dyn ScratchAllocator,
    ) -> Result<CompressedTracks, InterchangeError> {
        let result = match self {
            Self::Clip(clip, settings) => compress_clip(clip, settings, allocator),
            Self::List(list, settings) => compress_track_list(list, settings, allocator),
        };
        result.map_err(|error| {
            warn!(%error, "engine rejected the tracks");
            InterchangeError::CompressionFailed(error)
        })
    }

    fn measure(&self, tracks: CompressedTracksRef<'_>) -> Result<TrackError, InterchangeError> {
        let result = match self {
            Self::Clip(clip, _) => calculate_clip_error(clip, tracks),
            Self::List(list, _) => calculate_track_list_error(list, tracks),
        };
        result.map_err(InterchangeError::ErrorReportFailed)
    }
}

/// Copies `blob` to the front of `output`.
fn write_blob(blob: &CompressedTracks, output: &mut [u8]) -> Result<usize, InterchangeError> {
    let size = blob.size();
    let Some(destination) = output.get_mut(..size) else {
        warn!(needed = size, available = output.len(), "compressed blob does not fit");
        return Err(InterchangeError::BufferTooSmall {
            needed: size,
            actual: output.len(),
        });
    };
    destination.copy_from_slice(blob.as_bytes());
    debug!(bytes = size, kind = ?blob.kind(), "wrote compressed blob");
    Ok(size)
}

/// Compresses the tracks described by `metadata` and `raw_data` into `output`.
///
/// Returns the number of bytes written to `output`.
///
/// # Errors
///
/// - [`InterchangeError::UnsupportedSampleKind`] if the sample kind is not recognized
/// - [`InterchangeError::InvalidMetadataSize`] or [`InterchangeError::MalformedDescriptor`]
///   if `metadata` does not match its header
/// - [`InterchangeError::IndexOutOfRange`] if a descriptor index is not below the track count
/// - [`InterchangeError::InvalidRawDataSize`] if `raw_data` is smaller than the header implies
/// - [`InterchangeError::CompressionFailed`] if the engine rejects the tracks
/// - [`InterchangeError::BufferTooSmall`] if the blob does not fit `output`
///
/// # Examples
///
/// ```ignore
/// use anim_interchange_api::{compress_into, InterchangeSettings};
/// use anim_interchange_common::AlignedAllocator;
///
/// let written = compress_into(
///     &metadata,
///     &raw_data,
///     &mut output,
///     &InterchangeSettings::default(),
///     &AlignedAllocator,
/// )?;
/// let blob = &output[..written];
/// ```
pub fn compress_into(
    metadata: &[u8],
    raw_data: &[u8],
    output: &mut [u8],
    settings: &InterchangeSettings,
    allocator: &dyn ScratchAllocator,
) -> Result<usize, InterchangeError> {
    let source = SourceTracks::read(metadata, raw_data, settings)?;
    let blob = source.compress(allocator)?;
    write_blob(&blob, output)
}

/// Compresses the tracks described by `metadata` and `raw_data`, then overwrites `raw_data`
/// with the blob.
///
/// `raw_data` is first read completely; it then serves as the output buffer. Bytes past the
/// returned length are left untouched. On error `raw_data` is not modified.
///
/// # Errors
///
/// Same as [`compress_into`], with `raw_data` as the output buffer.
pub fn compress_in_place(
    metadata: &[u8],
    raw_data: &mut [u8],
    settings: &InterchangeSettings,
    allocator: &dyn ScratchAllocator,
) -> Result<usize, InterchangeError> {
    let source = SourceTracks::read(metadata, raw_data, settings)?;
    let blob = source.compress(allocator)?;
    write_blob(&blob, raw_data)
}

/// Like [`compress_in_place`], then measures the blob against the uncompressed tracks.
///
/// The worst case error is written over the front of `metadata` as an [`ErrorRecord`];
/// the descriptors there must not be reused afterwards.
///
/// # Errors
///
/// Same as [`compress_in_place`], plus [`InterchangeError::ErrorReportFailed`] if the blob
/// cannot be measured. In that case `raw_data` already holds the blob.
pub fn compress_with_error_report(
    metadata: &mut [u8],
    raw_data: &mut [u8],
    settings: &InterchangeSettings,
    allocator: &dyn ScratchAllocator,
) -> Result<CompressReport, InterchangeError> {
    let source = SourceTracks::read(metadata, raw_data, settings)?;
    let blob = source.compress(allocator)?;
    let bytes_written = write_blob(&blob, raw_data)?;

    let error = source.measure(blob.as_tracks_ref())?;
    ErrorRecord::from(error).write_to(metadata)?;
    debug!(
        track = error.index,
        error = error.error,
        sample_time = error.sample_time,
        "wrote error record"
    );

    Ok(CompressReport {
        bytes_written,
        error,
    })
}
