use primitive_types::U256;

/// Fixed-point scaling factor.
///
/// All reward-per-unit values are multiplied by this constant before storage
/// to preserve sub-unit precision without floating-point arithmetic.
/// Intermediate products are formed in `U256`, so `reward_rate × elapsed ×
/// PRECISION` never has to fit in `i128`.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

/// Accumulator value after one step, plus the scaled reward the floor
/// division could not hand out yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    pub reward_per_unit: i128,
    /// Always `< total_staked`; fed back into the next step.
    pub remainder: i128,
}

fn widen(value: i128) -> Option<U256> {
    u128::try_from(value).ok().map(U256::from)
}

fn narrow(value: U256) -> Option<i128> {
    let value = u128::try_from(value).ok()?;
    i128::try_from(value).ok()
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// Advance the global `reward_per_unit_stored` value.
///
/// This is the O(1) accumulation step:
///
/// ```text
/// scaled  = reward_rate × elapsed_seconds × PRECISION + remainder
/// Δrpu    = scaled / total_staked
/// new_rpu = stored_rpu + Δrpu
/// ```
///
/// `scaled % total_staked` is returned as the new remainder, so the floor
/// division never loses emission: what one step cannot distribute is carried
/// into the next.
///
/// When `total_staked` is zero nothing moves: the elapsed emission is not
/// banked and the remainder waits for the next staker.
///
/// Returns `None` if an input is negative or the new accumulator does not fit
/// in `i128`.
///
/// # Arguments
/// * `stored`       – current `reward_per_unit_stored` (scaled by PRECISION)
/// * `remainder`    – carry from the previous step
/// * `reward_rate`  – reward units emitted per second across *all* stakers
/// * `elapsed`      – seconds since the last update
/// * `total_staked` – sum of all active stakes, taken *before* any mutation
pub fn compute_reward_per_unit(
    stored: i128,
    remainder: i128,
    reward_rate: i128,
    elapsed: u64,
    total_staked: i128,
) -> Option<Step> {
    if total_staked <= 0 || elapsed == 0 {
        return Some(Step {
            reward_per_unit: stored,
            remainder,
        });
    }

    let scaled = widen(reward_rate)?
        .checked_mul(U256::from(elapsed))?
        .checked_mul(widen(PRECISION)?)?
        .checked_add(widen(remainder)?)?;
    let (delta, remainder) = scaled.div_mod(widen(total_staked)?);

    Some(Step {
        reward_per_unit: stored.checked_add(narrow(delta)?)?,
        remainder: narrow(remainder)?,
    })
}

/// Reward accrued by `staked` units since the snapshot `paid_rpu`.
///
/// ```text
/// accrued = staked × (current_rpu − paid_rpu) / PRECISION
/// ```
///
/// Only the accumulation *since the snapshot* is counted, so a repeated sync
/// at the same accumulator value yields zero. Floors, losing less than one
/// unit per call. `None` if the result does not fit in `i128`.
pub fn accrued(staked: i128, current_rpu: i128, paid_rpu: i128) -> Option<i128> {
    let delta = current_rpu.checked_sub(paid_rpu)?;
    let product = widen(staked)?.checked_mul(widen(delta)?)?;
    narrow(product / widen(PRECISION)?)
}

/// Emission rate that spreads `reward_pool` evenly over `horizon` seconds.
///
/// Floors, so the pool is never over-committed. `None` for a zero horizon or
/// a negative pool.
pub fn rate_for_pool(reward_pool: i128, horizon: u64) -> Option<i128> {
    if horizon == 0 || reward_pool < 0 {
        return None;
    }
    Some(reward_pool / i128::from(horizon))
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    fn step(rpu: i128, remainder: i128) -> Option<Step> {
        Some(Step {
            reward_per_unit: rpu,
            remainder,
        })
    }

    #[test]
    fn rpu_unchanged_when_no_stakers() {
        let rpu = compute_reward_per_unit(500, 3, 100, 60, 0);
        assert_eq!(rpu, step(500, 3), "RPU must not change when total_staked is zero");
    }

    #[test]
    fn rpu_unchanged_when_no_time_elapsed() {
        assert_eq!(compute_reward_per_unit(42, 0, 1_000, 0, 7), step(42, 0));
    }

    #[test]
    fn rpu_accumulates_correctly() {
        // reward_rate=10/s, elapsed=100s, total_staked=1_000
        // Δrpu = 10 × 100 × PRECISION / 1_000 = PRECISION
        let rpu = compute_reward_per_unit(0, 0, 10, 100, 1_000);
        assert_eq!(rpu, step(PRECISION, 0));
    }

    #[test]
    fn rpu_carries_the_division_remainder() {
        // 10^18 / 3 = 333_333_333_333_333_333 rem 1
        let first = compute_reward_per_unit(0, 0, 1, 1, 3).unwrap();
        assert_eq!(first.reward_per_unit, 333_333_333_333_333_333);
        assert_eq!(first.remainder, 1);

        // Three one-second steps add up to exactly one unit per staked unit.
        let second = compute_reward_per_unit(first.reward_per_unit, first.remainder, 1, 1, 3);
        let second = second.unwrap();
        let third = compute_reward_per_unit(second.reward_per_unit, second.remainder, 1, 1, 3);
        assert_eq!(third, step(PRECISION, 0));
    }

    #[test]
    fn rpu_keeps_small_rates_over_large_totals() {
        // 7-decimal asset: 115_740 units/s over 3×10^16 + 7 staked units.
        let total: i128 = 30_000_000_000_000_007;
        let mut state = Step {
            reward_per_unit: 0,
            remainder: 0,
        };
        for _ in 0..86_400 {
            state =
                compute_reward_per_unit(state.reward_per_unit, state.remainder, 115_740, 1, total)
                    .unwrap();
        }
        let one_shot = compute_reward_per_unit(0, 0, 115_740, 86_400, total).unwrap();
        assert_eq!(state, one_shot);
        assert_eq!(accrued(total, state.reward_per_unit, 0), Some(115_740 * 86_400 - 1));
    }

    #[test]
    fn rpu_intermediate_exceeds_i128() {
        // 100 tokens/s at 18 decimals for 20 days; the scaled product is ~1.7×10^44.
        let rate: i128 = 100_000_000_000_000_000_000;
        let elapsed = 20 * 86_400;
        let one_token: i128 = 1_000_000_000_000_000_000;
        let rpu = compute_reward_per_unit(0, 0, rate, elapsed, one_token).unwrap();
        assert_eq!(rpu.reward_per_unit, rate * i128::from(elapsed));
        assert_eq!(
            accrued(one_token, rpu.reward_per_unit, 0),
            Some(rate * i128::from(elapsed))
        );
    }

    #[test]
    fn rpu_reports_unrepresentable_accumulator() {
        assert_eq!(compute_reward_per_unit(0, 0, i128::MAX / 2, 10, 1), None);
        assert_eq!(compute_reward_per_unit(i128::MAX, 0, 1, 1, 1), None);
        assert_eq!(compute_reward_per_unit(0, 0, -1, 1, 1), None);
    }

    #[test]
    fn accrued_zero_at_snapshot() {
        assert_eq!(accrued(500, 100, 100), Some(0));
    }

    #[test]
    fn accrued_proportional_to_stake() {
        assert_eq!(accrued(1_000, PRECISION, 0), Some(1_000));
        assert_eq!(accrued(3_000, PRECISION, 0), Some(3_000));
    }

    #[test]
    fn accrued_floors_fractional_units() {
        // 3 × (PRECISION / 2) / PRECISION = 1.5 → 1
        assert_eq!(accrued(3, PRECISION / 2, 0), Some(1));
    }

    #[test]
    fn accrued_handles_large_amounts() {
        // 10^15 staked units with a 1000-unit-per-stake accumulation.
        let large_stake: i128 = 1_000_000_000_000_000;
        let rpu_delta = PRECISION * 1_000;
        assert_eq!(accrued(large_stake, rpu_delta, 0), Some(large_stake * 1_000));
        assert_eq!(accrued(i128::MAX, i128::MAX, 0), None);
    }

    #[test]
    fn pool_rate_floors_and_rejects_zero_horizon() {
        assert_eq!(rate_for_pool(1_000, 3), Some(333));
        assert_eq!(rate_for_pool(1_000, 0), None);
        assert_eq!(rate_for_pool(-1, 10), None);
    }
}
