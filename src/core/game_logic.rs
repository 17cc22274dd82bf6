//! State transitions for clicks, ticks and upgrade purchases.
//!
//! Every function here is pure: it reads a [`PlayerState`] and returns the
//! next one (or a [`GameError`]), leaving the input untouched.

use super::constants::{ROUNDING_FACTOR, ROUNDING_SCALE};
use super::error::GameError;
use super::game_state::PlayerState;
use super::rates::compute_rates;
use super::tables::{last_stage_index, upgrade_cost, ROUTE};
use super::tracks::Track;

/// Rounds to two decimal places, halves away from zero.
/// Carries and prestige multipliers are stored at this precision.
///
/// Rounding works on the exact binary value of `value`, not on
/// `value * 100`, so 0.585 (stored as 0.58499999...) becomes 0.58 while an
/// exact tie such as 0.125 becomes 0.13.
pub fn round2(value: f64) -> f64 {
    // From 2^52 up every f64 is a whole number
    if !value.is_finite() || value.abs() >= 4_503_599_627_370_496.0 {
        return value;
    }
    let hundredths = round_magnitude(value.abs());
    (hundredths as f64 / ROUNDING_SCALE).copysign(value)
}

/// `round(x * 100)` for `0 <= x < 2^52`, evaluated in integer arithmetic.
fn round_magnitude(x: f64) -> u128 {
    // x = mantissa * 2^-shift, and shift >= 1 below 2^52
    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7FF) as u32;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, shift) = if biased == 0 {
        (fraction, 1074)
    } else {
        (fraction | (1 << 52), 1075 - biased)
    };

    if shift > 120 {
        // Below 2^-67, far under half a hundredth
        return 0;
    }

    let scaled = u128::from(mantissa) * ROUNDING_FACTOR;
    let whole = scaled >> shift;
    let remainder = scaled - (whole << shift);
    let half = 1u128 << (shift - 1);
    if remainder >= half {
        whole + 1
    } else {
        whole
    }
}

/// Adds `rate` moon dust, banking whole units and carrying the fraction.
///
/// The carry is rounded to two decimals after each accrual. If that rounding
/// reaches a full unit, the unit is banked and the carry restarts at zero.
pub fn accrue(state: &PlayerState, rate: f64) -> PlayerState {
    let total = rate.max(0.0) + state.fractional_carry;
    let whole = total.floor();

    // `as` saturates for values beyond u128
    let mut gained = whole as u128;
    let mut carry = round2(total - whole);
    if carry >= 1.0 {
        gained = gained.saturating_add(1);
        carry = 0.0;
    }

    PlayerState {
        currency: state.currency.saturating_add(gained),
        fractional_carry: carry,
        ..state.clone()
    }
}

/// Processes one click. Never fails.
pub fn handle_click(state: &PlayerState) -> PlayerState {
    let rates = compute_rates(state);
    accrue(state, rates.click_yield)
}

/// Processes one scheduled tick: passive income, then route travel.
pub fn handle_tick(state: &PlayerState) -> PlayerState {
    let rates = compute_rates(state);
    let mut next = accrue(state, rates.passive_yield);
    advance_route(&mut next, rates.travel_speed);
    next
}

/// Moves toward the next stage. At most one stage per tick: progress past
/// 1.0 is dropped rather than carried into the following leg.
fn advance_route(state: &mut PlayerState, travel_speed: f64) {
    if state.route_index >= last_stage_index() {
        state.route_progress = 0.0;
        return;
    }

    let leg = &ROUTE[state.route_index + 1];
    state.route_progress += travel_speed / leg.distance_from_previous;

    if state.route_progress >= 1.0 {
        state.route_index += 1;
        state.route_progress = 0.0;
    }
}

/// Buys the next level of `track`.
pub fn handle_upgrade(state: &PlayerState, track: Track) -> Result<PlayerState, GameError> {
    let level = state.level(track);
    let cost = upgrade_cost(track, level + 1).ok_or(GameError::MaxLevelReached(track))?;

    if state.currency < cost {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: state.currency,
        });
    }

    let mut next = state.clone();
    next.currency -= cost;
    next.levels.set(track, level + 1);
    Ok(next)
}

/// Cost of the next level of `track`, or `None` when maxed.
pub fn next_upgrade_cost(state: &PlayerState, track: Track) -> Option<u128> {
    upgrade_cost(track, state.level(track) + 1)
}
