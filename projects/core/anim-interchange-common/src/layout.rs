//! Layouts of the elements written into caller owned output buffers.
//!
//! The decode path never lays a typed view over caller memory; these types only exist
//! so that element sizes and alignments come from the compiler rather than hand written
//! constants.

/// Native layout of one decoded transform (rotation, translation, scale).
///
/// 12 floats: rotation `[x, y, z, w]`, translation `[x, y, z, 0]`, scale `[x, y, z, 0]`.
/// Aligned like a SIMD quaternion followed by two SIMD vectors.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QvvfLayout {
    /// Rotation quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    /// Translation as `[x, y, z, 0]`.
    pub translation: [f32; 4],
    /// Scale as `[x, y, z, 0]`.
    pub scale: [f32; 4],
}

/// Size in bytes of one decoded transform.
pub const QVVF_SIZE: usize = core::mem::size_of::<QvvfLayout>();

/// Required alignment of an output buffer holding decoded transforms.
pub const QVVF_ALIGNMENT: usize = core::mem::align_of::<QvvfLayout>();

/// Size in bytes of one decoded scalar.
pub const SCALAR_SIZE: usize = core::mem::size_of::<f32>();

/// Required alignment of an output buffer holding decoded scalars.
pub const SCALAR_ALIGNMENT: usize = core::mem::align_of::<f32>();

/// Returns `true` if the start of `buffer` satisfies `alignment`.
#[inline]
pub fn is_aligned_for(buffer: &[u8], alignment: usize) -> bool {
    (buffer.as_ptr() as usize).is_multiple_of(alignment)
}

impl QvvfLayout {
    /// Flattens the element into the 12 floats written to the output buffer.
    #[inline]
    pub fn to_floats(&self) -> [f32; 12] {
        let mut out = [0.0f32; 12];
        out[0..4].copy_from_slice(&self.rotation);
        out[4..8].copy_from_slice(&self.translation);
        out[8..12].copy_from_slice(&self.scale);
        out
    }

    /// Reassembles an element from 12 floats in output order.
    #[inline]
    pub fn from_floats(floats: [f32; 12]) -> Self {
        let mut element = Self::default();
        element.rotation.copy_from_slice(&floats[0..4]);
        element.translation.copy_from_slice(&floats[4..8]);
        element.scale.copy_from_slice(&floats[8..12]);
        element
    }
}
