// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-tier TTL allocation.

use std::time::Duration;

use crate::ValidationError;

/// Computes the TTL granted to the tier at `tier_index` out of `tier_count` tiers.
///
/// The tier at index `i` receives `total_ttl / (tier_count - i)`: the slowest tier
/// (index `tier_count - 1`) keeps the full TTL and each faster tier gets a smaller
/// share, so fast tiers refresh from slower ones more often than slower ones refresh
/// from the loader. Division truncates at nanosecond precision.
///
/// | tiers | index 0 | index 1 | index 2 |
/// |-------|---------|---------|---------|
/// | 1     | `ttl`   |         |         |
/// | 2     | `ttl/2` | `ttl`   |         |
/// | 3     | `ttl/3` | `ttl/2` | `ttl`   |
///
/// # Errors
///
/// Returns a [`ValidationError`] if `tier_count` is zero or `tier_index` is not a
/// valid position.
///
/// # Examples
///
/// ```
/// use inception::allocate;
/// use std::time::Duration;
///
/// let ttl = Duration::from_secs(90);
/// assert_eq!(allocate(ttl, 3, 0)?, Duration::from_secs(30));
/// assert_eq!(allocate(ttl, 3, 1)?, Duration::from_secs(45));
/// assert_eq!(allocate(ttl, 3, 2)?, Duration::from_secs(90));
/// # Ok::<(), inception::ValidationError>(())
/// ```
pub fn allocate(total_ttl: Duration, tier_count: usize, tier_index: usize) -> Result<Duration, ValidationError> {
    if tier_count == 0 {
        return Err(ValidationError::new("tier count must be positive"));
    }
    if tier_index >= tier_count {
        return Err(ValidationError::new(format!(
            "tier index {tier_index} is out of range for {tier_count} tiers"
        )));
    }

    let share = u32::try_from(tier_count - tier_index)
        .map_err(|e| ValidationError::caused_by(format!("tier count {tier_count} is too large"), e))?;
    Ok(total_ttl / share)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tier_keeps_full_ttl() {
        assert_eq!(allocate(Duration::from_secs(10), 1, 0).unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn two_tiers_halve_the_front() {
        let ttl = Duration::from_secs(60);
        assert_eq!(allocate(ttl, 2, 0).unwrap(), Duration::from_secs(30));
        assert_eq!(allocate(ttl, 2, 1).unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn division_truncates_nanoseconds() {
        assert_eq!(allocate(Duration::from_nanos(10), 3, 0).unwrap(), Duration::from_nanos(3));
    }

    #[test]
    fn allocation_is_non_decreasing_and_last_gets_full_ttl() {
        let ttl = Duration::from_millis(12_345);
        for count in 1..=8 {
            let shares: Vec<Duration> = (0..count).map(|index| allocate(ttl, count, index).unwrap()).collect();
            assert!(shares.windows(2).all(|pair| pair[0] <= pair[1]), "{shares:?}");
            assert_eq!(shares[count - 1], ttl);
        }
    }

    #[test]
    fn zero_tiers_is_rejected() {
        let error = allocate(Duration::from_secs(1), 0, 0).unwrap_err();
        assert_eq!(error.reason(), "tier count must be positive");
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        let error = allocate(Duration::from_secs(1), 2, 2).unwrap_err();
        assert_eq!(error.reason(), "tier index 2 is out of range for 2 tiers");
    }
}
