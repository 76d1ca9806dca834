use proptest::prelude::*;

use tavern_types::{mul_div, Wad, SCALE};

proptest! {
    /// The wide path agrees with plain u128 arithmetic whenever the product fits.
    #[test]
    fn mul_div_matches_native_when_no_overflow(
        a in 0u128..u64::MAX as u128,
        b in 0u128..u64::MAX as u128,
        d in 1u128..u64::MAX as u128,
    ) {
        prop_assert_eq!(mul_div(a, b, d).unwrap(), a * b / d);
    }

    /// Scaling up then back down by the same factor is lossless.
    #[test]
    fn mul_div_scale_round_trip(amount in 0u128..(u128::MAX / SCALE), factor in 1u128..(1u128 << 100)) {
        let scaled = mul_div(amount, factor, 1).ok();
        if let Some(scaled) = scaled {
            prop_assert_eq!(mul_div(scaled, 1, factor).unwrap(), amount);
        }
        prop_assert_eq!(mul_div(amount, factor, factor).unwrap(), amount);
    }

    /// Applying a ratio >= 1.0 never shrinks an amount.
    #[test]
    fn wad_at_least_one_never_shrinks(amount in 0u128..(1u128 << 100), extra in 0u128..(10 * SCALE)) {
        let ratio = Wad::from_raw(SCALE + extra);
        prop_assert!(ratio.apply(amount).unwrap() >= amount);
    }
}
