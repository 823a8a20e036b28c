//! Validation utilities shared by the create and join flows

use crate::{Address, CoreError, MAX_HOUSE_CUT_BPS};

/// Length of a `0x`-prefixed 20 byte hex address.
pub const ADDRESS_LENGTH: usize = 42;

/// Loose shape check for a pick address.
///
/// Only the length and the `0x` prefix are checked. Hex digits and checksum
/// casing are left to the wallet and the contract.
pub fn is_valid_pick_address(s: &str) -> bool {
    s.len() == ADDRESS_LENGTH && s.starts_with("0x")
}

/// Keep the well-formed picks in their original order.
///
/// The result is not truncated to `max_picks`; use [`can_submit`] or
/// [`validate_picks`] before submitting.
pub fn collect_valid_picks<S: AsRef<str>>(raw_picks: &[S], _max_picks: u32) -> Vec<Address> {
    raw_picks
        .iter()
        .map(AsRef::as_ref)
        .filter(|pick| is_valid_pick_address(pick))
        .map(Address::from)
        .collect()
}

pub fn can_submit(valid_picks: &[Address], max_picks: u32) -> bool {
    !valid_picks.is_empty() && valid_picks.len() <= max_picks as usize
}

/// Validate raw pick inputs and return the picks to submit.
pub fn validate_picks<S: AsRef<str>>(
    raw_picks: &[S],
    max_picks: u32,
) -> Result<Vec<Address>, CoreError> {
    let picks = collect_valid_picks(raw_picks, max_picks);
    if !can_submit(&picks, max_picks) {
        return Err(CoreError::PickCount {
            got: picks.len(),
            max: max_picks,
        });
    }
    Ok(picks)
}

/// Convert a UI percentage into basis points, `round(percent * 100)`.
pub fn percent_to_bps(percent: f64) -> Result<u16, CoreError> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(CoreError::Validation(format!(
            "house cut must be a non-negative percentage, got {percent}"
        )));
    }
    let bps = (percent * 100.0).round();
    if bps > MAX_HOUSE_CUT_BPS as f64 {
        return Err(CoreError::Validation(format!(
            "house cut of {percent}% exceeds the {}% maximum",
            bps_to_percent(MAX_HOUSE_CUT_BPS)
        )));
    }
    Ok(bps as u16)
}

pub fn bps_to_percent(bps: u16) -> f64 {
    f64::from(bps) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(digit: char) -> String {
        format!("0x{}", digit.to_string().repeat(40))
    }

    #[test]
    fn test_pick_address_shape() {
        assert!(is_valid_pick_address(&format!("0x{}", "a".repeat(40))));
        assert!(!is_valid_pick_address("0xabc"));
        assert!(!is_valid_pick_address(&format!("abcd{}", "0".repeat(38))));
        // hex digits are deliberately not checked
        assert!(is_valid_pick_address(&format!("0x{}", "z".repeat(40))));
    }

    #[test]
    fn test_collect_preserves_order() {
        let raw = vec![addr('1'), "bad".to_string(), addr('2')];
        let picks = collect_valid_picks(&raw, 2);
        assert_eq!(
            picks,
            vec![Address::new(addr('1')), Address::new(addr('2'))]
        );
    }

    #[test]
    fn test_collect_does_not_truncate() {
        let raw = vec![addr('1'), addr('2'), addr('3')];
        let picks = collect_valid_picks(&raw, 1);
        assert_eq!(picks.len(), 3);
        assert!(!can_submit(&picks, 1));
        assert!(can_submit(&picks, 3));
    }

    #[test]
    fn test_validate_picks_bounds() {
        let none: Vec<String> = vec!["".into(), "0x12".into()];
        assert!(matches!(
            validate_picks(&none, 2),
            Err(CoreError::PickCount { got: 0, max: 2 })
        ));

        let too_many = vec![addr('1'), addr('2'), addr('3')];
        let err = validate_picks(&too_many, 2).unwrap_err();
        assert!(err.is_validation());

        let ok = validate_picks(&[addr('4')], 1).unwrap();
        assert_eq!(ok, vec![Address::new(addr('4'))]);
    }

    #[test]
    fn test_percent_bps_conversion() {
        assert_eq!(percent_to_bps(5.0).unwrap(), 500);
        assert_eq!(percent_to_bps(0.125).unwrap(), 13);
        assert_eq!(percent_to_bps(0.0).unwrap(), 0);
        assert_eq!(percent_to_bps(10.0).unwrap(), 1000);
        assert!(percent_to_bps(10.5).is_err());
        assert!(percent_to_bps(-1.0).is_err());
        assert!(percent_to_bps(f64::NAN).is_err());
        assert_eq!(bps_to_percent(500), 5.0);
    }
}
