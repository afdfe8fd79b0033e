//! Strategy engine: picks main numbers from a game's statistics.
//!
//! Every pick holds exactly `numbers_count` distinct numbers in `1..=max_number`, sorted
//! ascending. Strategies that need statistics fall back to a uniform pick without them.

use lvai_domain::lottery::LotteryRules;
use lvai_domain::strategy::Strategy;
use lvai_lottery::{NumberStatistics, sort_by_frequency};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::collections::BTreeMap;

/// Numbers chosen for one recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub numbers: Vec<u8>,
    pub special_number: Option<u8>,
}

/// Statistics of one chosen number as stored with the recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberBasis {
    pub frequency: u32,
    pub current_interval: u32,
    pub average_interval: Option<u32>,
}

pub fn pick<R: Rng + ?Sized>(
    strategy: Strategy,
    rules: &LotteryRules,
    stats: &[NumberStatistics],
    rng: &mut R,
) -> Pick {
    let k = usize::from(rules.numbers_count);
    let max = rules.max_number;
    let in_range: Vec<NumberStatistics> =
        stats.iter().filter(|s| (1..=max).contains(&s.number)).cloned().collect();

    let mut numbers = if in_range.is_empty() {
        uniform(max, k, &[], rng)
    } else {
        match strategy {
            Strategy::Random => uniform(max, k, &[], rng),
            Strategy::Hot => hot(max, k, in_range, rng),
            Strategy::Cold => cold(max, k, in_range, rng),
            Strategy::Overdue => overdue(max, k, &in_range, rng),
            Strategy::Balanced => balanced(max, k, in_range, rng),
        }
    };
    numbers.sort_unstable();

    let special_number = rules.special_max.map(|special_max| rng.random_range(1..=special_max));
    Pick { numbers, special_number }
}

/// `count` numbers from `1..=max` not in `taken`.
fn uniform<R: Rng + ?Sized>(max: u8, count: usize, taken: &[u8], rng: &mut R) -> Vec<u8> {
    let pool: Vec<u8> = (1..=max).filter(|n| !taken.contains(n)).collect();
    sample(&pool, count, rng)
}

fn sample<R: Rng + ?Sized>(pool: &[u8], count: usize, rng: &mut R) -> Vec<u8> {
    pool.choose_multiple(rng, count).copied().collect()
}

fn hot<R: Rng + ?Sized>(max: u8, k: usize, mut stats: Vec<NumberStatistics>, rng: &mut R) -> Vec<u8> {
    sort_by_frequency(&mut stats);
    let pool: Vec<u8> = stats.iter().take(k * 2).map(|s| s.number).collect();
    if pool.len() < k {
        return uniform(max, k, &[], rng);
    }
    sample(&pool, k, rng)
}

fn cold<R: Rng + ?Sized>(max: u8, k: usize, mut stats: Vec<NumberStatistics>, rng: &mut R) -> Vec<u8> {
    stats.sort_by(|a, b| a.frequency.cmp(&b.frequency).then(a.number.cmp(&b.number)));
    let pool: Vec<u8> = stats.iter().take(k * 2).map(|s| s.number).collect();
    if pool.len() < k {
        return uniform(max, k, &[], rng);
    }
    sample(&pool, k, rng)
}

fn overdue<R: Rng + ?Sized>(max: u8, k: usize, stats: &[NumberStatistics], rng: &mut R) -> Vec<u8> {
    let overdue: Vec<u8> = stats.iter().filter(|s| s.is_overdue()).map(|s| s.number).collect();
    if overdue.len() >= k {
        return sample(&overdue, k, rng);
    }
    let mut chosen = overdue;
    let fill = uniform(max, k - chosen.len(), &chosen, rng);
    chosen.extend(fill);
    chosen
}

fn balanced<R: Rng + ?Sized>(
    max: u8,
    k: usize,
    mut stats: Vec<NumberStatistics>,
    rng: &mut R,
) -> Vec<u8> {
    sort_by_frequency(&mut stats);
    let by_frequency: Vec<u8> = stats.iter().map(|s| s.number).collect();

    let hot_count = (k * 2 / 5).max(1);
    let hot_pool = &by_frequency[..by_frequency.len().min(hot_count * 2)];
    let mut chosen = sample(hot_pool, hot_count.min(hot_pool.len()), rng);

    let cold_count = (k * 3 / 10).max(1);
    let cold_pool: Vec<u8> = by_frequency[by_frequency.len().saturating_sub(cold_count * 2)..]
        .iter()
        .copied()
        .filter(|n| !chosen.contains(n))
        .collect();
    let cold = sample(&cold_pool, cold_count.min(cold_pool.len()), rng);
    chosen.extend(cold);

    let fill = uniform(max, k.saturating_sub(chosen.len()), &chosen, rng);
    chosen.extend(fill);
    chosen
}

/// 0.5 without statistics, otherwise the mean per-number score rounded to two decimals.
///
/// A number scores `min(frequency / 100, 1) * 0.5` plus 0.5 when overdue or 0.3 otherwise;
/// numbers without statistics score 0.
#[must_use]
pub fn confidence(numbers: &[u8], stats: &[NumberStatistics]) -> f64 {
    if stats.is_empty() || numbers.is_empty() {
        return 0.5;
    }

    let total: f64 = numbers
        .iter()
        .filter_map(|n| stats.iter().find(|s| s.number == *n))
        .map(|s| {
            let frequency = (f64::from(s.frequency) / 100.0).min(1.0) * 0.5;
            frequency + if s.is_overdue() { 0.5 } else { 0.3 }
        })
        .sum();

    (total / numbers.len() as f64 * 100.0).round() / 100.0
}

/// Statistics of the chosen numbers, keyed by number.
#[must_use]
pub fn basis(numbers: &[u8], stats: &[NumberStatistics]) -> BTreeMap<u8, NumberBasis> {
    numbers
        .iter()
        .filter_map(|n| stats.iter().find(|s| s.number == *n))
        .map(|s| {
            (s.number, NumberBasis {
                frequency: s.frequency,
                current_interval: s.current_interval,
                average_interval: s.average_interval,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvai_domain::lottery::LotteryType;
    use lvai_lottery::rebuild;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    fn history_stats(max: u8, draws: &[Vec<u8>]) -> Vec<NumberStatistics> {
        rebuild(max, draws.iter().map(|d| (0, d.as_slice())))
    }

    fn assert_valid(pick: &Pick, rules: &LotteryRules) {
        assert_eq!(pick.numbers.len(), usize::from(rules.numbers_count));
        assert!(pick.numbers.windows(2).all(|w| w[0] < w[1]), "sorted and distinct: {:?}", pick.numbers);
        assert!(pick.numbers.iter().all(|n| (1..=rules.max_number).contains(n)));
        match (rules.special_max, pick.special_number) {
            (Some(max), Some(n)) => assert!((1..=max).contains(&n)),
            (None, None) => {},
            other => panic!("special mismatch: {other:?}"),
        }
    }

    #[test]
    fn every_strategy_yields_a_valid_pick_for_every_game() {
        let mut rng = StdRng::seed_from_u64(7);
        for lottery in LotteryType::iter() {
            let rules = lottery.rules();
            let draws: Vec<Vec<u8>> = (0..30)
                .map(|seed| {
                    let mut history_rng = StdRng::seed_from_u64(seed);
                    uniform(rules.max_number, usize::from(rules.numbers_count), &[], &mut history_rng)
                })
                .collect();
            let stats = history_stats(rules.max_number, &draws);

            for strategy in Strategy::iter() {
                for _ in 0..20 {
                    assert_valid(&pick(strategy, &rules, &stats, &mut rng), &rules);
                    assert_valid(&pick(strategy, &rules, &[], &mut rng), &rules);
                }
            }
        }
    }

    #[test]
    fn hot_draws_from_the_most_frequent_numbers() {
        let rules = LotteryType::Daily539.rules();
        // 1..=10 drawn constantly, everything else never
        let draws = vec![vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10]];
        let stats = history_stats(rules.max_number, &draws);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let chosen = pick(Strategy::Hot, &rules, &stats, &mut rng);
            assert!(chosen.numbers.iter().all(|n| *n <= 10), "{:?}", chosen.numbers);
        }
    }

    #[test]
    fn cold_draws_from_the_least_frequent_numbers() {
        let rules = LotteryType::Daily539.rules();
        // 1..=30 drawn once, 31..=39 never
        let draws: Vec<Vec<u8>> = (0..6u8).map(|i| (i * 5 + 1..=i * 5 + 5).collect()).collect();
        let stats = history_stats(rules.max_number, &draws);
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..50 {
            let chosen = pick(Strategy::Cold, &rules, &stats, &mut rng);
            assert!(chosen.numbers.iter().all(|n| *n == 1 || *n > 30), "{:?}", chosen.numbers);
        }
    }

    #[test]
    fn overdue_takes_every_overdue_number_then_fills() {
        let rules = LotteryType::Daily539.rules();
        // 1 and 2 appear in the first two draws, then sit out four draws
        let mut draws = vec![vec![1, 2, 3, 4, 5]; 2];
        draws.extend((0..4).map(|_| vec![3, 4, 5, 6, 7]));
        let stats = history_stats(rules.max_number, &draws);
        let overdue: Vec<u8> = stats.iter().filter(|s| s.is_overdue()).map(|s| s.number).collect();
        assert!(overdue.contains(&1) && overdue.contains(&2));
        assert!(overdue.len() < 5);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let chosen = pick(Strategy::Overdue, &rules, &stats, &mut rng);
            assert!(overdue.iter().all(|n| chosen.numbers.contains(n)));
            assert_valid(&chosen, &rules);
        }
    }

    #[test]
    fn balanced_mixes_hot_and_cold() {
        let rules = LotteryType::BigLottery.rules();
        // 1..=6 hot, the rest never drawn
        let draws = vec![vec![1, 2, 3, 4, 5, 6]; 5];
        let stats = history_stats(rules.max_number, &draws);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..20 {
            let chosen = pick(Strategy::Balanced, &rules, &stats, &mut rng);
            // hot = max(1, 12 / 5) = 2 picked from the four most frequent numbers
            assert!(chosen.numbers.iter().filter(|n| **n <= 4).count() >= 2);
            // cold = max(1, 18 / 10) = 1 picked from 48 and 49
            assert!(chosen.numbers.iter().any(|n| *n >= 48));
        }
    }

    #[test]
    fn confidence_scores() {
        assert!((confidence(&[1, 2], &[]) - 0.5).abs() < f64::EPSILON);

        let stats = history_stats(5, &[vec![1], vec![1], vec![2], vec![2], vec![2]]);
        // 1: freq 2, overdue -> 0.01 + 0.5; 2: freq 3 -> 0.015 + 0.3
        let score = confidence(&[1, 2], &stats);
        assert!((score - 0.41).abs() < f64::EPSILON, "{score}");
        // unknown numbers contribute nothing
        let score = confidence(&[2, 40], &stats);
        assert!((score - 0.16).abs() < f64::EPSILON, "{score}");
    }

    #[test]
    fn basis_covers_chosen_numbers_with_statistics() {
        let stats = history_stats(5, &[vec![1, 2], vec![1, 3]]);
        let basis = basis(&[1, 4, 9], &stats);
        assert_eq!(basis.len(), 2);
        assert_eq!(basis[&1], NumberBasis { frequency: 2, current_interval: 0, average_interval: Some(1) });
        assert_eq!(basis[&4].frequency, 0);
        assert_eq!(serde_json::to_value(&basis).unwrap()["1"]["frequency"], 2);
    }
}
