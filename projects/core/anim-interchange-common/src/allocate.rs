//! Memory allocation utilities for engine owned intermediate objects.
//!
//! Compressed blobs are produced into scratch memory owned by the caller's allocator handle.
//! Every allocation is a [`ScratchBuffer`] which releases its memory when dropped, so an
//! early return on a failure path can never leak the intermediate object.
//!
//! ## Useful APIs
//!
//! [`allocate_aligned`]: Allocates zeroed memory with a given alignment.
//! [`AlignedAllocator`]: The default [`ScratchAllocator`] handle.
//!
//! ## Safety
//!
//! All allocation operations are wrapped in safe APIs that handle proper initialization,
//! cleanup, and error handling.

use core::alloc::{Layout, LayoutError};
use safe_allocator_api::allocator_api::*;
use safe_allocator_api::RawAlloc;
use thiserror::Error;

/// Alignment of compressed blobs, matching the widest SIMD load done while decoding.
pub const BLOB_ALIGNMENT: usize = 16;

/// A handle to the allocator used for scratch memory during a single call.
///
/// Implementations are passed explicitly into every encode entry point instead of
/// relying on a process wide allocator instance.
pub trait ScratchAllocator {
    /// Allocates `num_bytes` zeroed bytes aligned to `alignment`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocateError`] when the layout is invalid or the allocation fails.
    fn allocate(&self, num_bytes: usize, alignment: usize) -> Result<ScratchBuffer, AllocateError>;
}

/// Default [`ScratchAllocator`] backed by the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignedAllocator;

impl ScratchAllocator for AlignedAllocator {
    #[inline]
    fn allocate(&self, num_bytes: usize, alignment: usize) -> Result<ScratchBuffer, AllocateError> {
        allocate_aligned(num_bytes, alignment)
    }
}

/// An owned, zero initialized, aligned allocation.
pub struct ScratchBuffer {
    alloc: RawAlloc,
    len: usize,
}

impl ScratchBuffer {
    /// Number of bytes in the allocation.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the allocation holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets the allocation as a byte slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: The allocation is `len` bytes long and was zero initialized on creation.
        unsafe { core::slice::from_raw_parts(self.alloc.as_ptr(), self.len) }
    }

    /// Gets the allocation as a mutable byte slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: The allocation is `len` bytes long and was zero initialized on creation.
        unsafe { core::slice::from_raw_parts_mut(self.alloc.as_mut_ptr(), self.len) }
    }
}

impl core::fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScratchBuffer").field("len", &self.len).finish()
    }
}

/// Allocates zeroed data with the given alignment.
///
/// # Parameters
///
/// - `num_bytes`: The number of bytes to allocate
/// - `alignment`: Required alignment, must be a power of two
///
/// # Returns
///
/// A [`ScratchBuffer`] containing the allocated data
pub fn allocate_aligned(num_bytes: usize, alignment: usize) -> Result<ScratchBuffer, AllocateError> {
    if num_bytes == 0 {
        return Err(AllocateError::ZeroSized);
    }

    let layout = Layout::from_size_align(num_bytes, alignment)?;
    let mut alloc = RawAlloc::new(layout)?;

    // SAFETY: `alloc` is valid for writes of `num_bytes` bytes.
    unsafe { core::ptr::write_bytes(alloc.as_mut_ptr(), 0, num_bytes) };

    Ok(ScratchBuffer {
        alloc,
        len: num_bytes,
    })
}

/// An error that happened in memory allocation within the library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocateError {
    /// An error that occurred while creating a layout for allocation.
    #[error("Invalid layout provided. Likely due to `num_bytes` being larger than isize::MAX or a non power of two alignment. {0}")]
    LayoutError(#[from] LayoutError),

    /// An error that occurred while allocating memory.
    #[error(transparent)]
    AllocationFailed(#[from] AllocError),

    /// A zero sized allocation was requested.
    #[error("Zero sized allocations are not supported")]
    ZeroSized,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[rstest]
    #[case(1, 4)]
    #[case(48, 16)]
    #[case(4096, BLOB_ALIGNMENT)]
    fn allocation_is_aligned_and_zeroed(#[case] num_bytes: usize, #[case] alignment: usize) {
        let buffer = AlignedAllocator
            .allocate(num_bytes, alignment)
            .expect("allocation should succeed");

        assert_eq!(buffer.len(), num_bytes);
        assert!((buffer.as_slice().as_ptr() as usize).is_multiple_of(alignment));
        assert!(buffer.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_sized_allocation_is_rejected() {
        assert_eq!(
            allocate_aligned(0, BLOB_ALIGNMENT).unwrap_err(),
            AllocateError::ZeroSized
        );
    }

    #[test]
    fn non_power_of_two_alignment_is_rejected() {
        assert!(matches!(
            allocate_aligned(16, 3),
            Err(AllocateError::LayoutError(_))
        ));
    }

    #[test]
    fn writes_are_visible_through_slice() {
        let mut buffer = allocate_aligned(8, 8).unwrap();
        buffer.as_mut_slice()[3] = 0xAB;
        assert_eq!(buffer.as_slice()[3], 0xAB);
    }
}
