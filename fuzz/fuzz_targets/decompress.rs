#![no_main]

// Arbitrary bytes fed to the decode entry points must only ever produce a status,
// never a panic or an out of bounds write.

use anim_interchange_api::decompress::{decompress_track, decompress_tracks};
use anim_interchange_common::{SampleRoundingPolicy, QVVF_ALIGNMENT};
use libfuzzer_sys::{arbitrary, fuzz_target};

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct DecodeInput {
    pub blob: Vec<u8>,
    pub sample_time: f32,
    pub policy: u8,
    pub track_index: u32,
    pub output_len: u16,
}

fuzz_target!(|input: DecodeInput| {
    let policy = SampleRoundingPolicy::from_raw(i32::from(input.policy % 4))
        .unwrap_or(SampleRoundingPolicy::None);

    // Over-allocate so a 16 byte aligned window of the requested length always exists.
    let output_len = usize::from(input.output_len);
    let mut storage = vec![0u8; output_len + QVVF_ALIGNMENT];
    let offset = storage.as_ptr().align_offset(QVVF_ALIGNMENT);
    let output = &mut storage[offset..offset + output_len];

    let _ = decompress_tracks(&input.blob, input.sample_time, policy, output);
    let _ = decompress_track(
        &input.blob,
        input.sample_time,
        policy,
        input.track_index,
        output,
    );
});
