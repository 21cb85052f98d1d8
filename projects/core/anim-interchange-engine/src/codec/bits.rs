//! Bit packing for quantized samples.
//!
//! Values are packed least significant bit first into little-endian `u32` words.

/// Accumulates packed values into 32-bit words.
#[derive(Debug, Default)]
pub struct BitWriter {
    words: Vec<u32>,
    pending: u64,
    num_pending_bits: u32,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the lowest `num_bits` bits of `value`.
    #[inline]
    pub fn push(&mut self, value: u32, num_bits: u8) {
        debug_assert!(num_bits <= 32);
        let mask = if num_bits == 32 {
            u32::MAX as u64
        } else {
            (1u64 << num_bits) - 1
        };

        self.pending |= (value as u64 & mask) << self.num_pending_bits;
        self.num_pending_bits += num_bits as u32;
        while self.num_pending_bits >= 32 {
            self.words.push(self.pending as u32);
            self.pending >>= 32;
            self.num_pending_bits -= 32;
        }
    }

    /// Flushes the last partial word and appends every word to `out` in little-endian order.
    pub fn finish_into(mut self, out: &mut Vec<u8>) {
        if self.num_pending_bits > 0 {
            self.words.push(self.pending as u32);
        }
        for word in self.words {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }
}

/// Number of bytes used to pack `num_values` values of `num_bits` bits.
#[inline]
pub fn packed_size(num_values: usize, num_bits: u8) -> Option<usize> {
    let total_bits = num_values.checked_mul(num_bits as usize)?;
    Some(total_bits.div_ceil(32) * 4)
}

/// Reads a little-endian `u32` at `offset`.
///
/// # Panics
///
/// If `data` does not hold 4 bytes at `offset`.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

/// Reads a little-endian `f32` at `offset`.
///
/// # Panics
///
/// If `data` does not hold 4 bytes at `offset`.
#[inline]
pub fn read_f32_le(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32_le(data, offset))
}

/// Reads `num_bits` bits starting at `bit_offset` from data packed by [`BitWriter`].
///
/// # Panics
///
/// If the bits are not fully contained in `data`.
#[inline]
pub fn read_bits(data: &[u8], bit_offset: usize, num_bits: u8) -> u32 {
    let word_index = bit_offset / 32;
    let shift = (bit_offset % 32) as u32;

    let low = read_u32_le(data, word_index * 4) as u64;
    let high = if shift + num_bits as u32 > 32 {
        read_u32_le(data, (word_index + 1) * 4) as u64
    } else {
        0
    };

    let mask = (1u64 << num_bits) - 1;
    ((((high << 32) | low) >> shift) & mask) as u32
}
