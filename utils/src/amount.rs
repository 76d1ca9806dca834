//! Amount formatting for logs.

use tavern_types::Wad;

/// Render an 18-decimal amount as a decimal string (`1500000000000000000` → `"1.5"`).
pub fn format_amount(amount: u128) -> String {
    Wad::from_raw(amount).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_whole_and_fractional() {
        assert_eq!(format_amount(1_500_000_000_000_000_000), "1.5");
        assert_eq!(format_amount(2_000_000_000_000_000_000), "2.0");
        assert_eq!(format_amount(1), "0.000000000000000001");
    }
}
