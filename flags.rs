//! Bit-set flags passed to reads and writes. Single-byte sets with `has`/
//! `merge` operations; composite testing fails when only a strict subset of
//! a composite flag's bits is present.

use bitflags::bitflags;

bitflags! {
    /// Hints accompanying a read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReadFlags: u8 {
        const NONE = 0;
        const HINT_CACHE_MISS = 1 << 0;
        const HINT_READ_AHEAD = 1 << 1;
        const HINT_READ_AHEAD_2 = 1 << 2;
        const HINT_READ_AHEAD_3 = 1 << 3;
        const SKIP_DUPLICATE_READ = 1 << 4;
    }
}

bitflags! {
    /// Hints accompanying a write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WriteFlags: u8 {
        const NONE = 0;
        const LOW_PRIORITY = 1 << 0;
        const DISABLE_WAL = 1 << 1;
        const LOW_PRIORITY_AND_NO_WAL = Self::LOW_PRIORITY.bits() | Self::DISABLE_WAL.bits();
    }
}

impl ReadFlags {
    /// True only when every bit of `other` is present in `self`.
    pub fn has(self, other: ReadFlags) -> bool {
        self.contains(other)
    }

    /// Returns the union of `self` and `other`.
    pub fn merge(self, other: ReadFlags) -> ReadFlags {
        self | other
    }
}

impl WriteFlags {
    pub fn has(self, other: WriteFlags) -> bool {
        self.contains(other)
    }

    pub fn merge(self, other: WriteFlags) -> WriteFlags {
        self | other
    }
}

impl Default for ReadFlags {
    fn default() -> Self {
        ReadFlags::NONE
    }
}

impl Default for WriteFlags {
    fn default() -> Self {
        WriteFlags::NONE
    }
}
