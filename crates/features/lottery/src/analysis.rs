use crate::models::{AnalysisResponse, NumberFrequency};
use crate::statistics::{NumberStatistics, sort_by_frequency};
use lvai_domain::lottery::LotteryType;

const HOT_COLD_SIZE: usize = 10;
pub(crate) const RECENT_DRAWS: u64 = 5;

/// Share of draws containing a number, in percent with two decimals.
pub(crate) fn percentage(frequency: u32, total_draws: u64) -> f64 {
    if total_draws == 0 {
        return 0.0;
    }
    (f64::from(frequency) / total_draws as f64 * 10_000.0).round() / 100.0
}

/// Hot, cold and overdue numbers of a game plus its most recent results.
pub(crate) fn analyze(
    lottery_type: LotteryType,
    total_draws: u64,
    mut stats: Vec<NumberStatistics>,
    recent_numbers: Vec<Vec<u8>>,
) -> AnalysisResponse {
    sort_by_frequency(&mut stats);

    let frequency = |stat: &NumberStatistics| NumberFrequency {
        number: stat.number,
        frequency: stat.frequency,
        percentage: percentage(stat.frequency, total_draws),
    };

    let hot_numbers = stats.iter().take(HOT_COLD_SIZE).map(frequency).collect();
    let cold_numbers =
        stats[stats.len().saturating_sub(HOT_COLD_SIZE)..].iter().map(frequency).collect();
    let mut overdue_numbers: Vec<u8> =
        stats.iter().filter(|stat| stat.is_overdue()).map(|stat| stat.number).collect();
    overdue_numbers.sort_unstable();

    AnalysisResponse {
        success: true,
        lottery_type,
        total_draws,
        hot_numbers,
        cold_numbers,
        overdue_numbers,
        recent_numbers,
    }
}
