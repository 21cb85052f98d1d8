//! # Decompression Context
//!
//! A [`DecompressionContext`] is opened over a borrowed blob, parses the channel layout
//! once, then answers any number of seek and sample requests without copying the blob.
//!
//! ```ignore
//! let mut context = DecompressionContext::initialize(tracks)?;
//! context.seek(0.5, SampleRoundingPolicy::None);
//! let transform = context.sample_transform(0);
//! ```

use anim_interchange_common::{SampleRoundingPolicy, TrackType};
use glam::{Quat, Vec3, Vec4};

use crate::blob::{BlobError, CompressedTracksRef, FORMAT_VERSION};
use crate::codec::{ChannelView, CHANNEL_HEADER_SIZE};
use crate::compress::clip::{CHANNEL_COMPONENTS, CHANNEL_DEFAULTS};
use crate::error::EngineError;
use crate::qvv::Qvvf;

/// Sample positions closer than this to a whole sample snap onto it.
const SAMPLE_SNAP_EPSILON: f32 = 1.0e-4;

const SCALAR_DEFAULTS: [f32; 4] = [0.0; 4];

/// Seek and sample state over one compressed blob.
#[derive(Debug, Clone)]
pub struct DecompressionContext<'a> {
    tracks: CompressedTracksRef<'a>,
    track_type: TrackType,
    channels_per_track: usize,
    channels: Vec<ChannelView<'a>>,
    key0: usize,
    key1: usize,
    alpha: f32,
}

impl<'a> DecompressionContext<'a> {
    /// Opens a context over `tracks`, positioned at the first sample.
    ///
    /// Expects a blob that passed [`CompressedTracksRef::is_valid`]. Checks the format
    /// version and that the body holds exactly the channels the header describes.
    ///
    /// # Errors
    ///
    /// - [`BlobError::UnsupportedVersion`] for blobs of another format version
    /// - [`BlobError::InvalidHeader`] for an unknown track type
    /// - [`BlobError::MalformedBody`] if the body does not match the header
    pub fn initialize(tracks: CompressedTracksRef<'a>) -> Result<Self, EngineError> {
        let version = tracks.version();
        if version != FORMAT_VERSION {
            return Err(BlobError::UnsupportedVersion(version).into());
        }
        let track_type = tracks
            .track_type()
            .ok_or(BlobError::InvalidHeader("unknown track type"))?;

        let (channel_components, channels_per_track) = match track_type.num_scalar_components() {
            Some(num_components) => ([num_components, 0, 0], 1),
            None => (CHANNEL_COMPONENTS, CHANNEL_COMPONENTS.len()),
        };

        let body = tracks.body();
        let num_tracks = tracks.num_tracks() as usize;
        let num_samples = tracks.num_samples() as usize;

        // Every channel takes at least a header, which bounds the count for hostile headers.
        let max_channels = body.len() / CHANNEL_HEADER_SIZE;
        let num_channels = num_tracks.saturating_mul(channels_per_track);
        if num_channels > max_channels {
            return Err(BlobError::MalformedBody("more channels than the body can hold").into());
        }

        let mut channels = Vec::with_capacity(num_channels);
        let mut offset = 0;
        for _ in 0..num_tracks {
            for &num_components in &channel_components[..channels_per_track] {
                channels.push(ChannelView::parse(
                    body,
                    &mut offset,
                    num_components,
                    num_samples,
                )?);
            }
        }
        if offset != body.len() {
            return Err(BlobError::MalformedBody("trailing bytes after the last track").into());
        }

        Ok(Self {
            tracks,
            track_type,
            channels_per_track,
            channels,
            key0: 0,
            key1: 0,
            alpha: 0.0,
        })
    }

    /// The blob this context reads.
    #[inline]
    pub fn tracks(&self) -> &CompressedTracksRef<'a> {
        &self.tracks
    }

    /// Track type of every track.
    #[inline]
    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    /// Number of tracks.
    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.tracks.num_tracks() as usize
    }

    /// Positions the context at `sample_time` seconds.
    ///
    /// Times outside the clip are clamped to it, NaN seeks to the start. `policy` decides
    /// whether samples falling between two stored samples are interpolated or snapped.
    pub fn seek(&mut self, sample_time: f32, policy: SampleRoundingPolicy) {
        let duration = self.tracks.duration();
        let time = if sample_time.is_nan() {
            0.0
        } else {
            sample_time.clamp(0.0, duration)
        };

        let mut sample = time * self.tracks.sample_rate();
        let nearest = sample.round();
        if (sample - nearest).abs() < SAMPLE_SNAP_EPSILON {
            sample = nearest;
        }

        let last = (self.tracks.num_samples() as usize).saturating_sub(1);
        let key0 = (sample.floor() as usize).min(last);
        let key1 = (key0 + 1).min(last);
        let alpha = if key0 == key1 {
            0.0
        } else {
            (sample - key0 as f32).clamp(0.0, 1.0)
        };

        self.key0 = key0;
        self.key1 = key1;
        self.alpha = policy.apply(alpha);
    }

    /// Samples one transform track at the current position.
    ///
    /// Returns [`None`] if the blob does not hold transforms or the index is out of range.
    pub fn sample_transform(&self, track_index: usize) -> Option<Qvvf> {
        if self.track_type != TrackType::Qvvf {
            return None;
        }
        let views = self.track_channels(track_index)?;

        let start = decode_transform(views, self.key0);
        if self.alpha == 0.0 {
            return Some(start);
        }
        let end = decode_transform(views, self.key1);
        if self.alpha == 1.0 {
            return Some(end);
        }

        Some(Qvvf::new(
            start.rotation.lerp(end.rotation, self.alpha),
            start.translation.lerp(end.translation, self.alpha),
            start.scale.lerp(end.scale, self.alpha),
        ))
    }

    /// Samples one scalar track at the current position.
    ///
    /// Components beyond the track type's component count are zero. Returns [`None`] if
    /// the blob holds transforms or the index is out of range.
    pub fn sample_scalar(&self, track_index: usize) -> Option<Vec4> {
        let num_components = self.track_type.num_scalar_components()?;
        let view = self.track_channels(track_index)?.first()?;

        let decode = |key: usize| {
            let mut values = [0.0f32; 4];
            view.decode_sample(key, &SCALAR_DEFAULTS[..num_components], &mut values);
            Vec4::from_array(values)
        };

        let start = decode(self.key0);
        if self.alpha == 0.0 {
            return Some(start);
        }
        let end = decode(self.key1);
        if self.alpha == 1.0 {
            return Some(end);
        }
        Some(start.lerp(end, self.alpha))
    }

    fn track_channels(&self, track_index: usize) -> Option<&[ChannelView<'a>]> {
        let start = track_index.checked_mul(self.channels_per_track)?;
        let end = start.checked_add(self.channels_per_track)?;
        self.channels.get(start..end)
    }
}

/// Decodes the stored transform at `key` from its rotation, translation and scale channels.
fn decode_transform(views: &[ChannelView<'_>], key: usize) -> Qvvf {
    let mut values = [[0.0f32; 4]; 3];
    for (channel, view) in views.iter().enumerate() {
        let num_components = CHANNEL_COMPONENTS[channel];
        view.decode_sample(
            key,
            &CHANNEL_DEFAULTS[channel][..num_components],
            &mut values[channel],
        );
    }

    let mut rotation = Quat::from_array(values[0]);
    if views[0].is_quantized() {
        rotation = rotation.normalize();
    }
    Qvvf::new(
        rotation,
        Vec3::from_slice(&values[1][..3]),
        Vec3::from_slice(&values[2][..3]),
    )
}
