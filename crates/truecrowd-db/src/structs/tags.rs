//! 128-bit tag sets.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Maximum number of tags in a definition (one bit each).
pub const MAX_TAGS: usize = 128;

/// Bit `i` set means definition tag `i` applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TagBits {
    pub words: [u32; MAX_TAGS / 32],
}

impl TagBits {
    /// Set bit `index`. Indices past [`MAX_TAGS`] are ignored.
    pub fn set(&mut self, index: usize) {
        if index < MAX_TAGS {
            self.words[index / 32] |= 1 << (index % 32);
        }
    }

    /// Whether bit `index` is set.
    pub fn contains(&self, index: usize) -> bool {
        index < MAX_TAGS && self.words[index / 32] & (1 << (index % 32)) != 0
    }

    /// Set bit indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_TAGS).filter(|&i| self.contains(i))
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_iter() {
        let mut bits = TagBits::default();
        assert!(bits.is_empty());
        bits.set(0);
        bits.set(33);
        bits.set(127);
        bits.set(128);
        assert!(bits.contains(33));
        assert!(!bits.contains(32));
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0, 33, 127]);
        assert_eq!(bits.words[3], 0x8000_0000);
    }
}
