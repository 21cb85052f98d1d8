#![no_main]

// Compresses arbitrary metadata and raw samples. Whenever compression succeeds the
// produced blob must validate and decode.

use anim_interchange_api::{compress_into, decompress_tracks, validate_blob, InterchangeSettings};
use anim_interchange_common::{AlignedAllocator, SampleRoundingPolicy, QVVF_ALIGNMENT, QVVF_SIZE};
use libfuzzer_sys::{arbitrary, fuzz_target};

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct EncodeInput {
    pub metadata: Vec<u8>,
    pub raw_data: Vec<u8>,
    pub sample_time: f32,
}

fuzz_target!(|input: EncodeInput| {
    let mut blob = vec![0u8; input.raw_data.len() + 4096];
    let Ok(written) = compress_into(
        &input.metadata,
        &input.raw_data,
        &mut blob,
        &InterchangeSettings::default(),
        &AlignedAllocator,
    ) else {
        return;
    };

    let blob = &blob[..written];
    let tracks = validate_blob(blob).expect("freshly compressed blob must validate");

    let output_len = tracks.num_tracks() as usize * QVVF_SIZE;
    let mut storage = vec![0u8; output_len + QVVF_ALIGNMENT];
    let offset = storage.as_ptr().align_offset(QVVF_ALIGNMENT);
    let output = &mut storage[offset..offset + output_len];
    decompress_tracks(blob, input.sample_time, SampleRoundingPolicy::Nearest, output)
        .expect("freshly compressed blob must decode");
});
