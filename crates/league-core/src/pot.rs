//! Exact base-unit arithmetic for pots and house cuts

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Highest house cut the contract accepts (10%).
pub const MAX_HOUSE_CUT_BPS: u16 = 1_000;

/// Best-case pot if every slot fills, `None` when it does not fit in `u128`.
/// Informational only; `total_pot` is authoritative.
pub fn estimated_pot(entry_fee: u128, max_players: u32) -> Option<u128> {
    entry_fee.checked_mul(u128::from(max_players))
}

/// `floor(pot * bps / 10000)`
pub fn house_cut(pot: u128, house_cut_bps: u16) -> u128 {
    match pot.checked_mul(u128::from(house_cut_bps)) {
        Some(scaled) => scaled / BPS_DENOMINATOR,
        // divide first when the product would overflow, the result still fits
        None => {
            pot / BPS_DENOMINATOR * u128::from(house_cut_bps)
                + pot % BPS_DENOMINATOR * u128::from(house_cut_bps) / BPS_DENOMINATOR
        }
    }
}

/// What the contract should hold for `players` entries.
pub fn expected_total_pot(entry_fee: u128, players: usize) -> Option<u128> {
    entry_fee.checked_mul(u128::try_from(players).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_house_cut_is_exact() {
        let pot = estimated_pot(100 * ONE_TOKEN, 4).unwrap();
        assert_eq!(pot, 400 * ONE_TOKEN);
        assert_eq!(house_cut(pot, 500), 20 * ONE_TOKEN);
    }

    #[test]
    fn test_house_cut_floors() {
        assert_eq!(house_cut(999, 1), 0);
        assert_eq!(house_cut(10_001, 1), 1);
        assert_eq!(house_cut(12_345, 0), 0);
    }

    #[test]
    fn test_pot_overflow_is_reported() {
        assert_eq!(estimated_pot(u128::MAX, 2), None);
        assert_eq!(estimated_pot(u128::MAX, 1), Some(u128::MAX));
        assert_eq!(expected_total_pot(u128::MAX / 2, 3), None);
        assert_eq!(expected_total_pot(ONE_TOKEN, 0), Some(0));
    }

    #[test]
    fn test_house_cut_near_overflow() {
        let pot = u128::MAX / 2;
        let expected = pot / BPS_DENOMINATOR * 1000 + pot % BPS_DENOMINATOR * 1000 / BPS_DENOMINATOR;
        assert_eq!(house_cut(pot, 1000), expected);
        assert!(house_cut(pot, 1000) <= pot / 10);
    }
}
