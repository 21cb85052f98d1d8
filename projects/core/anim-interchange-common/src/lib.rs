#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![warn(missing_docs)]

/// Aligned scratch allocation and the allocator handle passed into every entry point.
pub mod allocate;

/// Native layouts of decoded output elements.
pub mod layout;

/// Rounding policy applied when seeking between samples.
pub mod rounding;

/// Track type tags.
pub mod track_type;

#[cfg(test)]
pub mod test_prelude;

pub use allocate::{AlignedAllocator, AllocateError, ScratchAllocator, ScratchBuffer};
pub use layout::{
    is_aligned_for, QvvfLayout, QVVF_ALIGNMENT, QVVF_SIZE, SCALAR_ALIGNMENT, SCALAR_SIZE,
};
pub use rounding::SampleRoundingPolicy;
pub use track_type::TrackType;
