//! Integration tests for the buffer interchange through the exported C entry points

use anim_interchange_api::c_api::compress::{aix_compress, aix_compress_with_error};
use anim_interchange_api::c_api::decompress::{aix_decompress_track, aix_decompress_tracks};
use anim_interchange_api::{compress_into, BlobLayout, InterchangeSettings};
use anim_interchange_common::{AlignedAllocator, QvvfLayout};
use anim_interchange_engine::blob::compute_hash;
use anim_interchange_engine::{
    compress_track_list, CompressionSettings, ScalarTrack, ScalarTrackDesc, TrackList,
};
use core::slice;

const NEAREST: i32 = 3;

fn f64_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_ne_bytes()).collect()
}

/// Views plain floats as their bytes.
fn as_bytes_mut<T: Copy>(values: &mut [T]) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(values.as_mut_ptr().cast::<u8>(), size_of_val(values)) }
}

/// Metadata for transform tracks given as `(parent_index, precision)`.
fn transform_metadata(samples: u32, tracks: &[(f64, f64)]) -> Vec<u8> {
    let mut fields = vec![tracks.len() as f64, 0.0, samples as f64, 30.0];
    for &(parent, precision) in tracks {
        fields.extend([-1.0, parent, precision, 1.0, 0.001, 0.001, 0.000_01]);
    }
    f64_bytes(&fields)
}

/// Metadata for scalar tracks given as `(output_index, precision)`.
fn scalar_metadata(samples: u32, tracks: &[(f64, f64)]) -> Vec<u8> {
    let mut fields = vec![tracks.len() as f64, 1.0, samples as f64, 30.0];
    for &(output_index, precision) in tracks {
        fields.extend([output_index, precision]);
    }
    f64_bytes(&fields)
}

/// Identity rotation and scale, translated by `translation`.
fn transform_sample(translation: [f64; 3]) -> [f64; 10] {
    let [x, y, z] = translation;
    [0.0, 0.0, 0.0, 1.0, x, y, z, 1.0, 1.0, 1.0]
}

/// Raw buffer from track-major samples, padded so the blob always fits.
fn raw_buffer(fields: &[f64]) -> Vec<u8> {
    let mut raw = f64_bytes(fields);
    raw.resize(raw.len().max(4096), 0);
    raw
}

/// Compresses in place and returns the blob.
fn compress(metadata: &[u8], mut raw: Vec<u8>) -> Vec<u8> {
    let written =
        unsafe { aix_compress(metadata.as_ptr(), metadata.len(), raw.as_mut_ptr(), raw.len()) };
    assert!(written > 0, "compression failed with {written}");
    raw.truncate(written as usize);
    raw
}

fn decode_pose(blob: &[u8], time: f32, policy: i32, pose: &mut [QvvfLayout]) -> i32 {
    let output = as_bytes_mut(pose);
    unsafe {
        aix_decompress_tracks(
            blob.as_ptr(),
            blob.len(),
            time,
            policy,
            output.as_mut_ptr(),
            output.len(),
        )
    }
}

fn decode_track(blob: &[u8], time: f32, policy: i32, index: u32, output: &mut [u8]) -> i32 {
    unsafe {
        aix_decompress_track(
            blob.as_ptr(),
            blob.len(),
            time,
            policy,
            index,
            output.as_mut_ptr(),
            output.len(),
        )
    }
}

fn two_bone_blob() -> Vec<u8> {
    let metadata = transform_metadata(4, &[(-1.0, 0.01), (-1.0, 0.01)]);
    let mut fields = Vec::new();
    for translation in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for _ in 0..4 {
            fields.extend(transform_sample(translation));
        }
    }
    compress(&metadata, raw_buffer(&fields))
}

fn ramp_blob() -> Vec<u8> {
    let metadata = scalar_metadata(4, &[(-1.0, 0.001)]);
    compress(&metadata, raw_buffer(&[0.0, 1.0, 2.0, 3.0]))
}

#[test]
fn test_two_bone_round_trip() {
    let blob = two_bone_blob();
    let mut pose = [QvvfLayout::default(); 2];

    assert_eq!(decode_pose(&blob, 0.0, NEAREST, &mut pose), 0);

    for (element, expected) in pose.iter().zip([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]) {
        for axis in 0..3 {
            assert!((element.translation[axis] - expected[axis]).abs() <= 0.01);
        }
        let [x, y, z, w] = element.rotation;
        assert!(w.abs() > 0.9999 && x.abs() < 0.01 && y.abs() < 0.01 && z.abs() < 0.01);
        assert_eq!(element.scale[..3], [1.0, 1.0, 1.0]);
    }
}

#[test]
fn test_every_sample_within_precision() {
    const SAMPLES: u32 = 12;
    let precisions = [0.01, 0.001, 0.1];
    let metadata = transform_metadata(SAMPLES, &precisions.map(|precision| (-1.0, precision)));

    // Root bones with animated translations only, so the object space error is the
    // translation error.
    let translation = |track: usize, sample: u32| {
        let phase = sample as f64 * 0.3 + track as f64;
        [phase.sin(), 2.0 * phase.cos(), 0.1 * sample as f64]
    };
    let mut fields = Vec::new();
    for track in 0..precisions.len() {
        for sample in 0..SAMPLES {
            fields.extend(transform_sample(translation(track, sample)));
        }
    }
    let blob = compress(&metadata, raw_buffer(&fields));

    // Thresholds are clip wide and come from the first descriptor.
    let threshold = precisions[0] as f32 + 1.0e-5;
    let mut pose = [QvvfLayout::default(); 3];
    for sample in 0..SAMPLES {
        assert_eq!(decode_pose(&blob, sample as f32 / 30.0, NEAREST, &mut pose), 0);
        for (track, element) in pose.iter().enumerate() {
            let expected = translation(track, sample);
            for axis in 0..3 {
                let error = (element.translation[axis] - expected[axis] as f32).abs();
                assert!(error <= threshold, "track {track} sample {sample}: {error}");
            }
        }
    }
}

#[test]
fn test_scalar_track_at_last_sample() {
    let values: Vec<f64> = (0..10).map(|sample| (sample as f64 * 0.7).sin() * 4.0).collect();
    let metadata = scalar_metadata(10, &[(-1.0, 0.001)]);
    let blob = compress(&metadata, raw_buffer(&values));

    let mut value = [0.0f32];
    assert_eq!(decode_track(&blob, 9.0 / 30.0, NEAREST, 0, as_bytes_mut(&mut value)), 0);
    assert!((value[0] - values[9] as f32).abs() <= 0.001);
}

#[test]
fn test_metadata_size_mismatch_returns_minus_one() {
    let metadata = scalar_metadata(4, &[(-1.0, 0.001), (-1.0, 0.001)]);
    for len in [metadata.len() - 8, metadata.len() + 8] {
        let mut resized = metadata.clone();
        resized.resize(len, 0);
        let mut raw = raw_buffer(&[1.0; 8]);
        let original = raw.clone();

        let status =
            unsafe { aix_compress(resized.as_ptr(), resized.len(), raw.as_mut_ptr(), raw.len()) };
        assert_eq!(status, -1);
        assert_eq!(raw, original);
    }
}

#[test]
fn test_short_raw_data_returns_minus_two() {
    let metadata = scalar_metadata(4, &[(-1.0, 0.001)]);
    let mut raw = f64_bytes(&[0.0, 1.0, 2.0]);
    let status =
        unsafe { aix_compress(metadata.as_ptr(), metadata.len(), raw.as_mut_ptr(), raw.len()) };
    assert_eq!(status, -2);
}

#[test]
fn test_raw_buffer_too_small_for_blob_returns_minus_four() {
    let metadata = scalar_metadata(1, &[(-1.0, 0.001)]);
    let mut raw = f64_bytes(&[0.5]);
    let status =
        unsafe { aix_compress(metadata.as_ptr(), metadata.len(), raw.as_mut_ptr(), raw.len()) };
    assert_eq!(status, -4);
}

#[test]
fn test_descriptor_index_out_of_range_returns_minus_five() {
    let metadata = transform_metadata(4, &[(-1.0, 0.01), (2.0, 0.01)]);
    let mut raw = raw_buffer(&[0.0; 80]);
    let status =
        unsafe { aix_compress(metadata.as_ptr(), metadata.len(), raw.as_mut_ptr(), raw.len()) };
    assert_eq!(status, -5);
}

#[test]
fn test_unknown_sample_kind_is_not_supported() {
    let mut metadata = scalar_metadata(4, &[(-1.0, 0.001)]);
    metadata[8..16].copy_from_slice(&(-1.0f64).to_ne_bytes());
    let mut raw = raw_buffer(&[0.0, 1.0, 2.0, 3.0]);
    let original = raw.clone();

    let status =
        unsafe { aix_compress(metadata.as_ptr(), metadata.len(), raw.as_mut_ptr(), raw.len()) };
    assert_eq!(status, 0);
    assert_eq!(raw, original);
}

#[test]
fn test_small_output_returns_minus_three_and_writes_nothing() {
    let blob = two_bone_blob();
    let mut pose = [QvvfLayout {
        rotation: [7.0; 4],
        translation: [7.0; 4],
        scale: [7.0; 4],
    }; 2];

    // Room for one element only.
    assert_eq!(decode_pose(&blob, 0.0, NEAREST, &mut pose[..1]), -3);
    assert_eq!(pose[0].rotation, [7.0; 4]);

    let output = as_bytes_mut(&mut pose);
    assert_eq!(decode_track(&blob, 0.0, NEAREST, 0, &mut output[..47]), -3);
    assert!(output.chunks_exact(4).all(|chunk| chunk == 7.0f32.to_ne_bytes()));
}

#[test]
fn test_misaligned_output_returns_minus_four() {
    let blob = two_bone_blob();
    let mut pose = [QvvfLayout::default(); 3];
    let output = as_bytes_mut(&mut pose);

    assert_eq!(decode_track(&blob, 0.0, NEAREST, 0, &mut output[4..]), -4);
    assert!(output.iter().all(|&byte| byte == 0));

    let scalars = ramp_blob();
    let mut values = [0.0f32; 4];
    let output = as_bytes_mut(&mut values);
    assert_eq!(decode_track(&scalars, 0.0, NEAREST, 0, &mut output[1..]), -4);
}

#[test]
fn test_track_index_out_of_range_returns_minus_five() {
    let blob = two_bone_blob();
    let mut pose = [QvvfLayout::default(); 1];
    for index in [2, 3, u32::MAX] {
        assert_eq!(
            decode_track(&blob, 0.0, NEAREST, index, as_bytes_mut(&mut pose)),
            -5
        );
    }
}

#[test]
fn test_decode_track_is_idempotent() {
    let blob = two_bone_blob();
    let mut first = [QvvfLayout::default(); 1];
    let mut second = [QvvfLayout::default(); 1];

    assert_eq!(decode_track(&blob, 0.021, 0, 1, as_bytes_mut(&mut first)), 0);
    assert_eq!(decode_track(&blob, 0.021, 0, 1, as_bytes_mut(&mut second)), 0);
    assert_eq!(as_bytes_mut(&mut first), as_bytes_mut(&mut second));
}

#[test]
fn test_rounding_policies() {
    let blob = ramp_blob();
    for (policy, expected) in [(0, 1.75), (1, 1.0), (2, 2.0), (3, 2.0)] {
        let mut value = [0.0f32];
        assert_eq!(
            decode_track(&blob, 1.75 / 30.0, policy, 0, as_bytes_mut(&mut value)),
            0
        );
        assert!(
            (value[0] - expected).abs() <= 0.002,
            "policy {policy}: {}",
            value[0]
        );
    }
}

#[test]
fn test_output_indices_reorder_tracks() {
    let metadata = scalar_metadata(2, &[(1.0, 0.001), (0.0, 0.001)]);
    let blob = compress(&metadata, raw_buffer(&[10.0, 10.0, 20.0, 20.0]));

    let mut values = [0.0f32; 2];
    let output = as_bytes_mut(&mut values);
    unsafe {
        assert_eq!(
            aix_decompress_tracks(blob.as_ptr(), blob.len(), 0.0, NEAREST, output.as_mut_ptr(), 8),
            0
        );
    }
    assert!((values[0] - 20.0).abs() <= 0.001);
    assert!((values[1] - 10.0).abs() <= 0.001);
}

#[test]
fn test_legacy_layout_decodes_identically() {
    let metadata = transform_metadata(4, &[(-1.0, 0.01), (0.0, 0.01)]);
    let mut fields = Vec::new();
    for track in 0..2 {
        for sample in 0..4 {
            fields.extend(transform_sample([track as f64, sample as f64 * 0.25, 0.0]));
        }
    }
    let raw = f64_bytes(&fields);

    let blobs = [BlobLayout::Legacy, BlobLayout::TrackList].map(|layout| {
        let mut output = vec![0u8; 4096];
        let settings = InterchangeSettings::builder().layout(layout).build();
        let written =
            compress_into(&metadata, &raw, &mut output, &settings, &AlignedAllocator).unwrap();
        output.truncate(written);
        output
    });
    assert_ne!(blobs[0][8..12], blobs[1][8..12]);

    let [legacy, unified] = &blobs;
    let mut legacy_pose = [QvvfLayout::default(); 2];
    let mut unified_pose = [QvvfLayout::default(); 2];
    assert_eq!(decode_pose(legacy, 0.05, 0, &mut legacy_pose), 0);
    assert_eq!(decode_pose(unified, 0.05, 0, &mut unified_pose), 0);
    assert_eq!(legacy_pose, unified_pose);
}

#[test]
fn test_legacy_scalar_layout_decodes() {
    let metadata = scalar_metadata(4, &[(-1.0, 0.001)]);
    let raw = f64_bytes(&[0.0, 1.0, 2.0, 3.0]);
    let mut blob = vec![0u8; 4096];
    let settings = InterchangeSettings::builder()
        .layout(BlobLayout::Legacy)
        .build();
    let written = compress_into(&metadata, &raw, &mut blob, &settings, &AlignedAllocator).unwrap();

    let mut value = [0.0f32];
    assert_eq!(
        decode_track(&blob[..written], 0.1, NEAREST, 0, as_bytes_mut(&mut value)),
        0
    );
    assert!((value[0] - 3.0).abs() <= 0.001);
}

#[test]
fn test_corrupt_blobs_return_minus_two() {
    let mut blob = ramp_blob();
    let last = blob.len() - 1;
    blob[last] ^= 0x5A;

    let mut value = [0.0f32];
    assert_eq!(decode_track(&blob, 0.0, NEAREST, 0, as_bytes_mut(&mut value)), -2);
}

#[test]
fn test_truncated_blobs_return_minus_one() {
    let blob = ramp_blob();
    let mut value = [0.0f32];
    assert_eq!(
        decode_track(&blob[..blob.len() - 1], 0.0, NEAREST, 0, as_bytes_mut(&mut value)),
        -1
    );
    assert_eq!(
        decode_track(&blob[..16], 0.0, NEAREST, 0, as_bytes_mut(&mut value)),
        -1
    );
}

#[test]
fn test_unsupported_version_returns_minus_six() {
    let mut blob = ramp_blob();
    blob[0x0C] = 2;
    let hash = compute_hash(&blob);
    blob[4..8].copy_from_slice(&hash.to_le_bytes());

    let mut value = [0.0f32];
    assert_eq!(decode_track(&blob, 0.0, NEAREST, 0, as_bytes_mut(&mut value)), -6);
}

#[test]
fn test_multi_component_tracks_return_minus_ten() {
    let mut track = ScalarTrack::new(
        ScalarTrackDesc {
            output_index: None,
            precision: 0.001,
        },
        3,
        4,
    );
    for sample in 0..4 {
        track.sample_mut(sample).fill(sample as f32);
    }
    let list = TrackList::new(vec![track], 4, 30.0);
    let blob =
        compress_track_list(&list, &CompressionSettings::default(), &AlignedAllocator).unwrap();

    let mut values = [0.0f32; 4];
    assert_eq!(
        decode_track(blob.as_bytes(), 0.0, NEAREST, 0, as_bytes_mut(&mut values)),
        -10
    );
}

#[test]
fn test_compress_with_error_reports_worst_track() {
    let mut metadata = scalar_metadata(6, &[(-1.0, 0.01), (-1.0, 0.01)]);
    let mut raw = raw_buffer(&[0.0, 0.3, 0.9, 1.7, 2.2, 2.4, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);

    let written = unsafe {
        aix_compress_with_error(
            metadata.as_mut_ptr(),
            metadata.len(),
            raw.as_mut_ptr(),
            raw.len(),
        )
    };
    assert!(written > 0);

    let field = |index: usize| f64::from_ne_bytes(metadata[index * 8..][..8].try_into().unwrap());
    // The constant track decodes exactly, so the animated one carries the error.
    assert_eq!(field(0), 0.0);
    assert!(field(1) <= 0.01);
    assert!(field(2) >= 0.0 && field(2) <= 5.0 / 30.0);
}
