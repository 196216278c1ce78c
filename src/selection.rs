//! # Selection — Uniform Draws Without Replacement
//!
//! Draws unique box (or pallet) numbers from a 1-based range. Each draw is a
//! single call into `rand::seq::index::sample`, so a request either gets its
//! complete sample or an error, never a partial one.
//!
//! The plain functions use the thread-local generator; the `_with` variants
//! take a caller-owned RNG so a seeded `StdRng` gives reproducible draws.

use crate::error::SamplingError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build a reproducible generator from a seed.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draw `count` unique numbers from `1..=population`, sorted ascending.
pub fn select_random_boxes(population: u32, count: u32) -> Result<Vec<u32>, SamplingError> {
    select_random_boxes_with(&mut rand::rng(), population, count)
}

/// [`select_random_boxes`] with an explicit RNG.
pub fn select_random_boxes_with<R: Rng + ?Sized>(
    rng: &mut R,
    population: u32,
    count: u32,
) -> Result<Vec<u32>, SamplingError> {
    select_in_window_with(rng, 1, population, count)
}

/// Draw `count` unique numbers from `first..first + len`, sorted ascending.
///
/// Used by continuous numbering, where each pallet owns a contiguous window.
pub fn select_in_window_with<R: Rng + ?Sized>(
    rng: &mut R,
    first: u32,
    len: u32,
    count: u32,
) -> Result<Vec<u32>, SamplingError> {
    if count > len {
        return Err(SamplingError::QuantityExceedsPopulation {
            requested: count as u64,
            population: len as u64,
        });
    }
    let mut drawn: Vec<u32> = rand::seq::index::sample(rng, len as usize, count as usize)
        .into_iter()
        .map(|i| first + i as u32)
        .collect();
    drawn.sort_unstable();
    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn draws_exact_count_sorted_unique_in_range() {
        let boxes = select_random_boxes(1000, 48).unwrap();
        assert_eq!(boxes.len(), 48);
        assert!(boxes.windows(2).all(|w| w[0] < w[1]));
        assert!(boxes.iter().all(|&b| (1..=1000).contains(&b)));
    }

    #[test]
    fn full_population_returns_every_box() {
        let boxes = select_random_boxes(37, 37).unwrap();
        assert_eq!(boxes, (1..=37).collect::<Vec<_>>());
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(select_random_boxes(10, 0).unwrap().is_empty());
    }

    #[test]
    fn count_above_population_is_rejected() {
        assert_eq!(
            select_random_boxes(10, 11),
            Err(SamplingError::QuantityExceedsPopulation {
                requested: 11,
                population: 10
            })
        );
    }

    #[test]
    fn window_offsets_are_respected() {
        let mut rng = seeded_rng(7);
        let boxes = select_in_window_with(&mut rng, 101, 50, 50).unwrap();
        assert_eq!(boxes.first(), Some(&101));
        assert_eq!(boxes.last(), Some(&150));
    }

    #[test]
    fn same_seed_same_draw() {
        let a = select_random_boxes_with(&mut seeded_rng(42), 5000, 94).unwrap();
        let b = select_random_boxes_with(&mut seeded_rng(42), 5000, 94).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_draws_vary() {
        let draws: HashSet<Vec<u32>> = (0..20)
            .map(|_| select_random_boxes(10000, 10).unwrap())
            .collect();
        assert!(draws.len() > 1, "20 draws of 10 from 10000 were identical");
    }

    #[test]
    fn every_box_can_be_drawn() {
        // 2000 draws of 2 from 10: each box is expected ~400 times.
        let mut seen = [0u32; 10];
        let mut rng = seeded_rng(1);
        for _ in 0..2000 {
            for b in select_random_boxes_with(&mut rng, 10, 2).unwrap() {
                seen[(b - 1) as usize] += 1;
            }
        }
        for (i, &n) in seen.iter().enumerate() {
            assert!(n > 250 && n < 550, "box {} drawn {} times", i + 1, n);
        }
    }
}
