use std::fmt::Write;

use rand::Rng;

const FNV_OFFSET_BASIS_64: u64 = 0xCBF29CE484222325;
const FNV_PRIME_64: u64 = 1099511628211;

/// http://en.wikipedia.org/wiki/Fowler_Noll_Vo_hash
///
/// ```plain
/// algorithm fnv-1 is
///     hash := FNV_offset_basis
///
///     for each byte_of_data to be hashed do
///         hash := hash × FNV_prime
///         hash := hash XOR byte_of_data
///
///     return hash
/// ```
pub fn fnvhash64(mut val: u64) -> u64 {
    let mut hash = FNV_OFFSET_BASIS_64;

    for _ in 0..8 {
        let byte = val as u8;
        val >>= 8;

        hash = hash.wrapping_mul(FNV_PRIME_64);
        hash ^= byte as u64;
    }

    hash
}

/// Build a payload of `len` random lowercase letters.
pub fn random_letters(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Deterministic cell payload for data-integrity checks: a hash chain seeded
/// from the key and field name, extended until `size` bytes are available.
/// The same `(size, key, field)` triple always renders the same bytes.
pub fn deterministic_value(size: usize, key: &str, field: &str) -> String {
    let mut ret = String::with_capacity(size);
    ret.write_str(key).unwrap();
    ret.write_char(':').unwrap();
    ret.write_str(field).unwrap();
    while ret.len() < size {
        ret.write_char(':').unwrap();
        let hash = ahash::RandomState::with_seed(0).hash_one(&ret);
        write!(&mut ret, "{hash}").unwrap();
    }
    ret.truncate(size);
    ret
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    #[test]
    fn test_fnvhash64_deterministic() {
        assert_eq!(fnvhash64(42), fnvhash64(42));
        assert_ne!(fnvhash64(42), fnvhash64(43));
    }

    #[test]
    fn test_random_letters() {
        let mut rng = SmallRng::seed_from_u64(0);
        let s = random_letters(&mut rng, 100);
        assert_eq!(s.len(), 100);
        assert!(s.bytes().all(|b| b.is_ascii_lowercase()));
    }

    #[test]
    fn test_deterministic_value() {
        let a = deterministic_value(100, "user42", "field3");
        let b = deterministic_value(100, "user42", "field3");
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert!(a.starts_with("user42:field3"));
        assert_ne!(a, deterministic_value(100, "user42", "field4"));
    }
}
