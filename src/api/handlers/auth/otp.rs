//! One-time-passcode generation.

use rand::{rngs::OsRng, Rng};

pub(super) const OTP_LENGTH: usize = 6;

/// Generate a fixed-length numeric code from the OS entropy source.
pub(super) fn generate() -> String {
    let code = OsRng.gen_range(0..1_000_000u32);
    format!("{code:0width$}", width = OTP_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_fixed_length_digits() {
        for _ in 0..100 {
            let code = generate();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_vary_across_calls() {
        let codes: std::collections::HashSet<String> = (0..50).map(|_| generate()).collect();
        // 50 draws from a million values colliding into one is not credible.
        assert!(codes.len() > 1);
    }
}
