//! Decimal token amounts <-> base units, without floating point

use crate::CoreError;

/// Decimals of the staking token.
pub const TOKEN_DECIMALS: u8 = 18;

fn unit_scale(decimals: u8) -> Result<u128, CoreError> {
    10u128
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| CoreError::InvalidAmount(format!("{decimals} decimals is out of range")))
}

/// Parse a user-entered decimal amount such as `"100"` or `"0.25"` into base units.
pub fn parse_token_amount(input: &str, decimals: u8) -> Result<u128, CoreError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CoreError::InvalidAmount("amount is empty".into()));
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(CoreError::InvalidAmount(input.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(CoreError::InvalidAmount(format!(
            "{input} has more than {decimals} decimal places"
        )));
    }

    let scale = unit_scale(decimals)?;
    let overflow = || CoreError::InvalidAmount(format!("{input} is too large"));

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| overflow())?
            .checked_mul(scale)
            .ok_or_else(overflow)?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padding = unit_scale(decimals - fraction.len() as u8)?;
        fraction.parse::<u128>().map_err(|_| overflow())? * padding
    };

    whole_units.checked_add(fraction_units).ok_or_else(overflow)
}

/// Render base units as a decimal string, trimming trailing zeros (`"100"`, `"1.5"`).
pub fn format_token_amount(units: u128, decimals: u8) -> String {
    let Ok(scale) = unit_scale(decimals) else {
        return units.to_string();
    };
    let whole = units / scale;
    let fraction = units % scale;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(parse_token_amount("100", TOKEN_DECIMALS).unwrap(), 100 * ONE_TOKEN);
        assert_eq!(parse_token_amount("0.5", TOKEN_DECIMALS).unwrap(), ONE_TOKEN / 2);
        assert_eq!(parse_token_amount(".25", TOKEN_DECIMALS).unwrap(), ONE_TOKEN / 4);
        assert_eq!(parse_token_amount(" 7. ", TOKEN_DECIMALS).unwrap(), 7 * ONE_TOKEN);
        assert_eq!(parse_token_amount("0.000000000000000001", 18).unwrap(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", ".", "abc", "-1", "1.2.3", "1e18", "0.0000000000000000001"] {
            assert!(
                parse_token_amount(bad, TOKEN_DECIMALS).is_err(),
                "{bad:?} should be rejected"
            );
        }
        assert!(parse_token_amount("999999999999999999999999", TOKEN_DECIMALS).is_err());
    }

    #[test]
    fn test_format_trims_zeros() {
        assert_eq!(format_token_amount(100 * ONE_TOKEN, TOKEN_DECIMALS), "100");
        assert_eq!(format_token_amount(ONE_TOKEN + ONE_TOKEN / 2, TOKEN_DECIMALS), "1.5");
        assert_eq!(format_token_amount(1, TOKEN_DECIMALS), "0.000000000000000001");
        assert_eq!(format_token_amount(0, TOKEN_DECIMALS), "0");
        assert_eq!(format_token_amount(1234, 0), "1234");
    }
}
