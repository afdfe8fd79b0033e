//! Per-number statistics derived from a game's full draw history.

/// Frequency and gap figures of one number. Intervals count draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberStatistics {
    pub number: u8,
    pub frequency: u32,
    /// `draw_date` (UTC millis) of the latest draw containing the number.
    pub last_appeared: Option<i64>,
    pub average_interval: Option<u32>,
    pub max_interval: Option<u32>,
    pub current_interval: u32,
}

impl NumberStatistics {
    /// The current gap exceeds the average one. Numbers that never appeared are not overdue.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.average_interval.is_some_and(|average| average > 0 && self.current_interval > average)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tracker {
    appearances: u32,
    gap_sum: u64,
    gap_max: u32,
    last_index: Option<u32>,
    last_date: Option<i64>,
}

/// Rebuilds the statistics of numbers `1..=max_number` from draws in chronological order.
///
/// Each draw is `(draw_date, main_numbers)`. The first gap of a number is counted from the
/// start of history, so a number drawn in the very first draw has a first gap of 1.
pub fn rebuild<'a, I>(max_number: u8, draws: I) -> Vec<NumberStatistics>
where
    I: IntoIterator<Item = (i64, &'a [u8])>,
{
    let mut trackers = vec![Tracker::default(); usize::from(max_number) + 1];
    let mut total: u32 = 0;

    for (date, numbers) in draws {
        let index = total;
        total += 1;

        for &number in numbers {
            if number == 0 || number > max_number {
                continue;
            }
            let tracker = &mut trackers[usize::from(number)];
            let gap = tracker.last_index.map_or(index + 1, |previous| index - previous);

            tracker.appearances += 1;
            tracker.gap_sum += u64::from(gap);
            tracker.gap_max = tracker.gap_max.max(gap);
            tracker.last_index = Some(index);
            tracker.last_date = Some(date);
        }
    }

    (1..=max_number)
        .map(|number| {
            let tracker = trackers[usize::from(number)];
            let current_interval =
                tracker.last_index.map_or(total, |last| total - 1 - last);
            let average_interval = (tracker.appearances > 0).then(|| {
                (tracker.gap_sum as f64 / f64::from(tracker.appearances)).round() as u32
            });

            NumberStatistics {
                number,
                frequency: tracker.appearances,
                last_appeared: tracker.last_date,
                average_interval,
                max_interval: Some(tracker.gap_max.max(current_interval)),
                current_interval,
            }
        })
        .collect()
}

/// Sorts by frequency descending, lower numbers first on ties.
pub fn sort_by_frequency(stats: &mut [NumberStatistics]) {
    stats.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(max: u8, draws: &[&[u8]]) -> Vec<NumberStatistics> {
        rebuild(max, draws.iter().enumerate().map(|(i, numbers)| (i as i64 * 10, *numbers)))
    }

    #[test]
    fn covers_every_number_in_range() {
        let stats = build(5, &[&[1, 2]]);
        assert_eq!(stats.len(), 5);
        assert_eq!(stats.iter().map(|s| s.number).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn gaps_frequency_and_last_date() {
        // draws: #0 {1,2}, #1 {1,3}, #2 {2,3}, #3 {1,4}
        let stats = build(5, &[&[1, 2], &[1, 3], &[2, 3], &[1, 4]]);

        let one = &stats[0];
        assert_eq!(one.frequency, 3);
        assert_eq!(one.last_appeared, Some(30));
        // gaps 1, 1, 2
        assert_eq!(one.average_interval, Some(1));
        assert_eq!(one.max_interval, Some(2));
        assert_eq!(one.current_interval, 0);

        let two = &stats[1];
        // gaps 1, 2; one draw since
        assert_eq!(two.frequency, 2);
        assert_eq!(two.average_interval, Some(2));
        assert_eq!(two.current_interval, 1);
        assert_eq!(two.max_interval, Some(2));

        let four = &stats[3];
        // first seen in the 4th draw
        assert_eq!((four.frequency, four.average_interval, four.current_interval), (1, Some(4), 0));
    }

    #[test]
    fn never_drawn_numbers() {
        let stats = build(5, &[&[1], &[2], &[3]]);
        let five = &stats[4];
        assert_eq!(five.frequency, 0);
        assert_eq!(five.last_appeared, None);
        assert_eq!(five.average_interval, None);
        assert_eq!(five.current_interval, 3);
        assert_eq!(five.max_interval, Some(3));
        assert!(!five.is_overdue());
    }

    #[test]
    fn current_gap_counts_toward_max() {
        let two: &[u8] = &[2];
        let mut draws: Vec<&[u8]> = vec![&[1]];
        draws.extend(std::iter::repeat_n(two, 6));
        let one = &build(2, &draws)[0];
        assert_eq!(one.average_interval, Some(1));
        assert_eq!(one.current_interval, 6);
        assert_eq!(one.max_interval, Some(6));
        assert!(one.is_overdue());
    }

    #[test]
    fn out_of_range_numbers_are_ignored() {
        let stats = build(3, &[&[0, 1, 9]]);
        assert_eq!(stats.iter().map(|s| s.frequency).sum::<u32>(), 1);
    }

    #[test]
    fn frequency_order_breaks_ties_by_number() {
        let mut stats = build(4, &[&[3, 2], &[3, 4]]);
        sort_by_frequency(&mut stats);
        assert_eq!(stats.iter().map(|s| s.number).collect::<Vec<_>>(), [3, 2, 4, 1]);
    }
}
