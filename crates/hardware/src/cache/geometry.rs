//! Cache Geometry and Address Decoding.
//!
//! Derives the set count and field widths of a level from its configuration and splits
//! 32-bit addresses into tag, set index and block offset:
//!
//! ```text
//!  31                     offset_bits + index_bits   offset_bits         0
//! +-------------------------------+-----------------------+--------------+
//! |              tag              |       set index       |    offset    |
//! +-------------------------------+-----------------------+--------------+
//! ```
//!
//! Shifts are performed in 64-bit arithmetic so a geometry whose offset and index
//! fields cover the full address (tag width 0) is well-formed.

use crate::common::ConfigError;
use crate::config::CacheConfig;

/// Width of a trace address in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Fields of a decoded address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedAddr {
    /// Address bits above index and offset.
    pub tag: u32,
    /// Set index.
    pub index: usize,
    /// Byte offset within the block.
    pub offset: u32,
}

/// Immutable geometry derived once from a [`CacheConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    offset_bits: u32,
    index_bits: u32,
    index_mask: u64,
}

impl Geometry {
    /// Validates `config` and derives its geometry.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::BlockSizeNotPowerOfTwo`] if the block size is zero or not a power of two.
    /// - [`ConfigError::ZeroAssociativity`] if `ways` is zero.
    /// - [`ConfigError::ZeroCapacity`] if `size_bytes` is zero.
    /// - [`ConfigError::CapacityNotDivisible`] if capacity is not a multiple of `ways * line_bytes`.
    /// - [`ConfigError::SetCountNotPowerOfTwo`] if the derived set count is not a power of two.
    /// - [`ConfigError::AddressTooNarrow`] if offset and index need more than 32 bits.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let cache = || config.name.clone();

        if !config.line_bytes.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo {
                cache: cache(),
                line_bytes: config.line_bytes,
            });
        }
        if config.ways == 0 {
            return Err(ConfigError::ZeroAssociativity { cache: cache() });
        }
        if config.size_bytes == 0 {
            return Err(ConfigError::ZeroCapacity { cache: cache() });
        }

        let not_divisible = || ConfigError::CapacityNotDivisible {
            cache: cache(),
            size_bytes: config.size_bytes,
            ways: config.ways,
            line_bytes: config.line_bytes,
        };
        let set_bytes = config
            .ways
            .checked_mul(config.line_bytes)
            .ok_or_else(not_divisible)?;
        if config.size_bytes % set_bytes != 0 {
            return Err(not_divisible());
        }

        let num_sets = config.size_bytes / set_bytes;
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo {
                cache: cache(),
                num_sets,
            });
        }

        let offset_bits = config.line_bytes.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        if offset_bits + index_bits > ADDRESS_BITS {
            return Err(ConfigError::AddressTooNarrow {
                cache: cache(),
                bits: offset_bits + index_bits,
            });
        }

        Ok(Self {
            num_sets,
            ways: config.ways,
            line_bytes: config.line_bytes,
            offset_bits,
            index_bits,
            index_mask: (1u64 << index_bits) - 1,
        })
    }

    /// Number of sets.
    #[inline(always)]
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Associativity.
    #[inline(always)]
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Block size in bytes.
    #[inline(always)]
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// `log2(line_bytes)`.
    #[inline(always)]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// `log2(num_sets)`.
    #[inline(always)]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// `2^index_bits - 1`.
    #[inline(always)]
    pub const fn index_mask(&self) -> u64 {
        self.index_mask
    }

    /// Byte offset of `addr` within its block.
    #[inline(always)]
    pub const fn offset(&self, addr: u32) -> u32 {
        (addr as u64 & (self.line_bytes as u64 - 1)) as u32
    }

    /// Set index of `addr`.
    #[inline(always)]
    pub const fn index(&self, addr: u32) -> usize {
        ((addr as u64 >> self.offset_bits) & self.index_mask) as usize
    }

    /// Tag of `addr`.
    #[inline(always)]
    pub const fn tag(&self, addr: u32) -> u32 {
        (addr as u64 >> (self.offset_bits + self.index_bits)) as u32
    }

    /// Splits `addr` into its three fields.
    pub const fn decode(&self, addr: u32) -> DecodedAddr {
        DecodedAddr {
            tag: self.tag(addr),
            index: self.index(addr),
            offset: self.offset(addr),
        }
    }

    /// Rebuilds the block-aligned address of the block holding `tag` in set `index`.
    ///
    /// The result is truncated to the 32-bit address width.
    pub const fn block_address(&self, tag: u32, index: usize) -> u32 {
        let tag_part = (tag as u64) << (self.offset_bits + self.index_bits);
        let index_part = (index as u64) << self.offset_bits;
        (tag_part | index_part) as u32
    }

    /// Clears the offset bits of `addr`.
    #[inline(always)]
    pub const fn block_align(&self, addr: u32) -> u32 {
        (addr as u64 & !(self.line_bytes as u64 - 1)) as u32
    }
}
