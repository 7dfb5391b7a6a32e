//! Deterministic hashing.
//!
//! Highlight styles and "random" highlight colors must come out the same on
//! every render of the same text, so they are derived from these hashes
//! rather than from an RNG.

/// Integer hash function using bit manipulation.
///
/// Produces a pseudo-random u32 from an input u32. Good for seeding
/// and deriving other random values.
#[inline]
pub fn hash(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x
}

/// Hash a string (FNV-1a over its UTF-8 bytes, finalised with [`hash`]).
pub fn hash_str(s: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for b in s.bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    hash(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash(42), hash(42));
        assert_ne!(hash(1), hash(2));
    }

    #[test]
    fn test_hash_str() {
        assert_eq!(hash_str("测试"), hash_str("测试"));
        assert_ne!(hash_str("测试"), hash_str("测验"));
        assert_ne!(hash_str(""), hash_str(" "));
    }
}
