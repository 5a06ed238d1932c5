//! SM-2 spaced repetition algorithm.
//!
//! Four answer buttons map onto the 0-5 quality scale (Again = 0, Hard = 3,
//! Good = 4, Easy = 5). Any quality of 3 or more counts as a successful
//! recall, so Hard grows the interval exactly like a minimal Good.

use super::SpacedRepetitionAlgorithm;
use crate::types::{Rating, ReviewState};
use chrono::{DateTime, Duration, Utc};

/// Lowest quality that counts as a successful recall.
const PASSING_QUALITY: u8 = 3;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful review.
    pub first_interval: u32,
    /// Interval after the second consecutive successful review.
    pub second_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1,
            second_interval: 6,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState {
        ReviewState {
            ease_factor: self.initial_ease,
            ..ReviewState::new(now)
        }
    }

    fn schedule(&self, state: &ReviewState, rating: Rating, now: DateTime<Utc>) -> ReviewState {
        self.schedule_quality(state, rating.quality(), now)
    }
}

impl Sm2 {
    /// Core update over the full 0-5 quality range.
    fn schedule_quality(&self, state: &ReviewState, quality: u8, now: DateTime<Utc>) -> ReviewState {
        let (interval, repetitions) = if quality >= PASSING_QUALITY {
            let interval = match state.repetitions {
                0 => self.first_interval,
                1 => self.second_interval,
                _ => (f64::from(state.interval) * state.ease_factor).round() as u32,
            };
            (interval, state.repetitions + 1)
        } else {
            // Lapse: back through the graduation steps
            (self.first_interval, 0)
        };

        let ease_factor = self.next_ease(state.ease_factor, quality);

        ReviewState {
            last_review: now,
            next_review: Some(now + Duration::days(i64::from(interval))),
            interval,
            repetitions,
            ease_factor,
        }
    }

    /// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at `minimum_ease`.
    fn next_ease(&self, ease: f64, quality: u8) -> f64 {
        let miss = f64::from(5u8.saturating_sub(quality));
        let ease = ease + (0.1 - miss * (0.08 + miss * 0.02));
        ease.max(self.minimum_ease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Card;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const DAY_MS: i64 = 86_400_000;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn state(interval: u32, repetitions: u32, ease_factor: f64) -> ReviewState {
        ReviewState {
            interval,
            repetitions,
            ease_factor,
            ..ReviewState::new(now())
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn graduation_ladder() {
        let sm2 = Sm2::default();
        let first = sm2.schedule(&sm2.initial_state(now()), Rating::Good, now());
        assert_eq!((first.interval, first.repetitions), (1, 1));

        let second = sm2.schedule(&first, Rating::Good, now());
        assert_eq!((second.interval, second.repetitions), (6, 2));

        let third = sm2.schedule(&second, Rating::Good, now());
        assert_eq!(third.repetitions, 3);
        assert_eq!(third.interval, (6.0 * second.ease_factor).round() as u32);
    }

    #[test]
    fn mature_card_rated_good() {
        let sm2 = Sm2::default();
        let next = sm2.schedule(&state(6, 2, 2.5), Rating::Good, now());
        assert_eq!(next.interval, 15);
        assert_eq!(next.repetitions, 3);
        assert!(approx(next.ease_factor, 2.5));
    }

    #[test]
    fn ease_adjustment_per_rating() {
        let sm2 = Sm2::default();
        let expected = [
            (Rating::Again, 1.7),
            (Rating::Hard, 2.36),
            (Rating::Good, 2.5),
            (Rating::Easy, 2.6),
        ];
        for (rating, ease) in expected {
            let next = sm2.schedule(&state(6, 2, 2.5), rating, now());
            assert!(approx(next.ease_factor, ease), "{rating}: {}", next.ease_factor);
        }
    }

    #[test]
    fn failure_resets_progress() {
        let sm2 = Sm2::default();
        for prior in [state(0, 0, 2.5), state(6, 2, 2.5), state(120, 9, 1.3)] {
            let next = sm2.schedule(&prior, Rating::Again, now());
            assert_eq!(next.repetitions, 0);
            assert_eq!(next.interval, 1);
        }
        for quality in 0..PASSING_QUALITY {
            let next = sm2.schedule_quality(&state(40, 5, 2.0), quality, now());
            assert_eq!((next.interval, next.repetitions), (1, 0));
        }
    }

    #[test]
    fn hard_still_counts_as_recall() {
        let sm2 = Sm2::default();
        let next = sm2.schedule(&state(10, 3, 2.0), Rating::Hard, now());
        assert_eq!(next.repetitions, 4);
        assert_eq!(next.interval, 20);
    }

    #[test]
    fn ease_factor_never_below_minimum() {
        let sm2 = Sm2::default();
        let priors = [1.3, 1.31, 1.5, 2.5, 3.7];
        for quality in 0..=5 {
            for ease in priors {
                let mut current = state(6, 2, ease);
                for _ in 0..5 {
                    current = sm2.schedule_quality(&current, quality, now());
                    assert!(current.ease_factor >= sm2.minimum_ease);
                }
            }
        }
    }

    #[test]
    fn next_review_is_interval_days_after_now() {
        let sm2 = Sm2::default();
        for rating in Rating::ALL {
            let next = sm2.schedule(&state(6, 2, 2.5), rating, now());
            assert_eq!(next.last_review, now());
            let gap = next.next_review.unwrap() - next.last_review;
            assert_eq!(gap.num_milliseconds(), i64::from(next.interval) * DAY_MS);
        }
    }

    #[test]
    fn rate_keeps_card_content() {
        let mut card = Card::new("c1", "Rio?", "river", now());
        card.mnemonic = Some("a river of rice".into());
        let rated = crate::algorithm::rate(&card, Rating::Easy, now());
        assert_eq!(rated.id, card.id);
        assert_eq!(rated.question, card.question);
        assert_eq!(rated.mnemonic, card.mnemonic);
        assert_eq!(rated.review.repetitions, 1);
        assert!(!rated.is_due(now()));
    }
}
