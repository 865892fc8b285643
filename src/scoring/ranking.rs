use std::cmp::Ordering;

use super::config::{RankKey, RankingPolicy, TieBreak};
use super::types::{round2, StudentExamResult};

fn rank_key(result: &StudentExamResult, key: RankKey) -> f64 {
    match key {
        RankKey::Percentage => round2(result.percentage),
        RankKey::TotalMarks => round2(result.total_marks_obtained),
    }
}

/// Ordering used for ranking: key descending, then admission number and
/// student id ascending so equal keys always come out in the same order.
pub fn compare_for_rank(a: &StudentExamResult, b: &StudentExamResult, key: RankKey) -> Ordering {
    rank_key(b, key)
        .total_cmp(&rank_key(a, key))
        .then_with(|| a.admission_no.cmp(&b.admission_no))
        .then_with(|| a.student_id.cmp(&b.student_id))
}

/// Sort results into rank order and assign `rank` (1-based).
///
/// Any ranks already present are overwritten.
pub fn rank_results(results: &mut [StudentExamResult], policy: RankingPolicy) {
    results.sort_by(|a, b| compare_for_rank(a, b, policy.key));

    let mut previous_key: Option<f64> = None;
    let mut current_rank = 0u32;
    for (idx, result) in results.iter_mut().enumerate() {
        let key = rank_key(result, policy.key);
        let position = idx as u32 + 1;
        current_rank = match policy.ties {
            TieBreak::Shared if previous_key == Some(key) => current_rank,
            _ => position,
        };
        result.rank = Some(current_rank);
        previous_key = Some(key);
    }
}
