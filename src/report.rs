use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::api::{ApiClient, ClassReportQuery};
use crate::scoring::{rank_results, RankingPolicy, StudentExamResult};

/// Results of one section as returned by the server
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub section_id: u64,
    pub results: Vec<StudentExamResult>,
}

/// Fetch the class report of every given section in parallel.
///
/// A failing section is logged and skipped; the call only fails when every
/// section failed. Reports come back ordered by section id.
pub async fn fetch_class_reports(
    client: &ApiClient,
    exam_id: u64,
    class_id: u64,
    sections: &[u64],
    session_id: u64,
) -> Result<Vec<SectionReport>> {
    let mut futures = FuturesUnordered::new();
    for &section_id in sections {
        let query = ClassReportQuery {
            exam_id,
            class_id,
            section_id,
            session_id,
        };
        futures.push(async move { (section_id, client.class_report(&query).await) });
    }

    let mut reports = Vec::new();
    let mut last_error = None;
    while let Some((section_id, result)) = futures.next().await {
        match result {
            Ok(results) => {
                debug!(section_id, students = results.len(), "fetched section report");
                reports.push(SectionReport {
                    section_id,
                    results,
                });
            }
            Err(e) => {
                warn!(section_id, error = %e, "section report failed");
                last_error = Some(e);
            }
        }
    }

    if reports.is_empty() {
        if let Some(e) = last_error {
            return Err(anyhow::Error::new(e).context("All section reports failed"));
        }
    }

    reports.sort_by_key(|r| r.section_id);
    Ok(reports)
}

/// Merge sections into one class-wide list and rank it.
///
/// A student appearing in more than one section is kept once (first section
/// wins). Server-assigned section ranks are replaced.
pub fn combine_sections(
    reports: Vec<SectionReport>,
    policy: RankingPolicy,
) -> Vec<StudentExamResult> {
    let mut seen = HashSet::new();
    let mut combined: Vec<StudentExamResult> = reports
        .into_iter()
        .flat_map(|report| report.results)
        .filter(|result| seen.insert(result.student_id))
        .collect();

    rank_results(&mut combined, policy);
    combined
}
