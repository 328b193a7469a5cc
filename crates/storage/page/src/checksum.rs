//! Adler-32-style page checksum.
//!
//! Computed over the whole page with the checksum field itself treated as
//! zero, matching the reference store's `compute_page_checksum`: `a` starts
//! at 1, `b` at 0; for every byte, `a` updates before `b`, both mod 65521.

use crate::PAGE_SIZE;
use crate::header::CHECKSUM;

const MOD_ADLER: u32 = 65521;

/// Computes the page checksum, treating the checksum field's own bytes as
/// zero regardless of what is actually stored there.
pub fn compute_checksum(data: &[u8; PAGE_SIZE]) -> u32 {
    let checksum_range = CHECKSUM..CHECKSUM + 4;

    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for (i, &byte) in data.iter().enumerate() {
        let byte = if checksum_range.contains(&i) { 0 } else { byte as u32 };
        a = (a + byte) % MOD_ADLER;
        b = (b + a) % MOD_ADLER;
    }

    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_of_all_zero_page_is_stable() {
        let data = [0u8; PAGE_SIZE];
        let checksum = compute_checksum(&data);
        assert_eq!(checksum, compute_checksum(&data));
    }

    #[test]
    fn checksum_field_contents_do_not_affect_result() {
        let mut a = [0u8; PAGE_SIZE];
        let mut b = [0u8; PAGE_SIZE];
        b[CHECKSUM..CHECKSUM + 4].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(compute_checksum(&a), compute_checksum(&b));

        a[100] = 7;
        b[100] = 7;
        assert_eq!(compute_checksum(&a), compute_checksum(&b));
    }

    #[test]
    fn checksum_changes_with_content() {
        let a = [0u8; PAGE_SIZE];
        let mut b = [0u8; PAGE_SIZE];
        b[500] = 1;
        assert_ne!(compute_checksum(&a), compute_checksum(&b));
    }
}
