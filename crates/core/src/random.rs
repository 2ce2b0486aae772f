//! Random source and distribution helpers
//!
//! Every generator takes its random source as a parameter. A seeding run
//! derives one ChaCha stream per batch from a single seed, so any batch can
//! be regenerated in isolation.

use chrono::{DateTime, Months, TimeDelta, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Independent random stream for one batch of a seeded run
pub fn batch_rng(seed: u64, batch_index: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(batch_index);
    rng
}

/// Uniform integer in `min..=max`
pub fn int_between<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Uniform float in `min..max`, rounded to `decimals` places
pub fn float_between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, decimals: u32) -> f64 {
    let raw = if max <= min {
        min
    } else {
        rng.random_range(min..max)
    };
    round_to(raw, decimals)
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Uniform pick from a non-empty slice
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Uniform instant in `from..=to` at millisecond resolution.
///
/// Returns `from` when the interval is empty.
pub fn instant_between<R: Rng + ?Sized>(
    rng: &mut R,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (to - from).num_milliseconds();
    if span <= 0 {
        return from;
    }
    from + TimeDelta::milliseconds(rng.random_range(0..=span))
}

/// Instant within the `years` preceding `now`
pub fn past<R: Rng + ?Sized>(rng: &mut R, years: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    let from = now
        .checked_sub_months(Months::new(12 * years))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    instant_between(rng, from, now)
}

/// Birth date of someone aged between `min_age` and `max_age` years at `now`
pub fn birthdate<R: Rng + ?Sized>(
    rng: &mut R,
    min_age: u32,
    max_age: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let youngest = now
        .checked_sub_months(Months::new(12 * min_age))
        .unwrap_or(now);
    let oldest = now
        .checked_sub_months(Months::new(12 * (max_age + 1)))
        .map(|t| t + TimeDelta::days(1))
        .unwrap_or(youngest);
    instant_between(rng, oldest, youngest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_batch_streams_differ_and_repeat() {
        let a: u64 = batch_rng(42, 0).random();
        let b: u64 = batch_rng(42, 1).random();
        let again: u64 = batch_rng(42, 0).random();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn test_int_between_inclusive() {
        let mut rng = batch_rng(1, 0);
        let mut seen = [false; 3];
        for _ in 0..500 {
            let v = int_between(&mut rng, 1, 3);
            assert!((1..=3).contains(&v));
            seen[(v - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(int_between(&mut rng, 4, 4), 4);
    }

    #[test]
    fn test_float_between_rounds() {
        let mut rng = batch_rng(2, 0);
        for _ in 0..200 {
            let v = float_between(&mut rng, 96.0, 104.0, 1);
            assert!((96.0..=104.0).contains(&v));
            assert!((v * 10.0 - (v * 10.0).round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_instant_between_bounds() {
        let mut rng = batch_rng(3, 0);
        let from = now() - TimeDelta::days(3);
        for _ in 0..200 {
            let t = instant_between(&mut rng, from, now());
            assert!(t >= from && t <= now());
        }
        assert_eq!(instant_between(&mut rng, now(), from), now());
    }

    #[test]
    fn test_birthdate_age_bounds() {
        let mut rng = batch_rng(4, 0);
        for _ in 0..500 {
            let dob = birthdate(&mut rng, 18, 95, now());
            let age_days = (now() - dob).num_days();
            assert!(age_days >= 18 * 365);
            assert!(age_days <= 96 * 366);
        }
    }

    #[test]
    fn test_past_within_years() {
        let mut rng = batch_rng(5, 0);
        for _ in 0..200 {
            let t = past(&mut rng, 5, now());
            assert!(t <= now());
            assert!(now() - t <= TimeDelta::days(5 * 366));
        }
    }
}
