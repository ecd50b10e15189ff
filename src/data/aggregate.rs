//! Peer-relative mark statistics.
//!
//! Pipeline: raw rows -> score validation -> per-partition mean and
//! descending rank -> annotated records. Every record belongs to two
//! overlapping partitions: its course, and its specific course offering
//! (course+year+session).

use std::collections::HashMap;

use crate::data::records::{MarkRecord, RawRecord, ScoredRecord};

/// Validate a scraped score string into a non-negative integer.
///
/// Accepts any numeric string and truncates toward zero, so `"89.5"`
/// becomes `89`. Empty, non-numeric, and negative values are rejected and
/// the record stays out of aggregation entirely.
fn parse_score(raw: &str) -> Option<u32> {
    if raw.is_empty() {
        return None;
    }
    let numeric: f64 = raw.parse().ok()?;
    if !numeric.is_finite() || numeric < 0.0 {
        return None;
    }
    Some(numeric as u32)
}

/// Aggregates for one partition: unrounded mean plus the score list sorted
/// descending for rank lookups.
struct GroupStats {
    mean: f64,
    sorted_desc: Vec<u32>,
}

impl GroupStats {
    fn from_scores(mut scores: Vec<u32>) -> Self {
        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64;
        scores.sort_unstable_by(|a, b| b.cmp(a));
        Self {
            mean,
            sorted_desc: scores,
        }
    }

    /// 1-based rank: position of the first equal score value in the
    /// descending order. Tied scores all report the first match's rank.
    /// Not dense ranking; downstream consumers depend on this exact form.
    fn rank(&self, score: u32) -> usize {
        self.sorted_desc
            .iter()
            .position(|&s| s == score)
            .expect("score missing from its own partition")
            + 1
    }

    fn rank_label(&self, score: u32) -> String {
        format!("{} | {}", self.rank(score), self.sorted_desc.len())
    }

    fn average_label(&self) -> String {
        format!("{:.2}", self.mean)
    }
}

/// Annotate every record with its partitions' average and rank.
///
/// Input order is preserved. Records with an invalid or empty score pass
/// through unchanged as [`MarkRecord::Unscored`]; they contribute nothing
/// to any partition. An empty input yields an empty output.
pub fn augment(records: Vec<RawRecord>) -> Vec<MarkRecord> {
    let mut course_scores: HashMap<String, Vec<u32>> = HashMap::new();
    let mut offering_scores: HashMap<String, Vec<u32>> = HashMap::new();

    for record in &records {
        if let Some(score) = parse_score(&record.score) {
            course_scores
                .entry(record.course.clone())
                .or_default()
                .push(score);
            offering_scores
                .entry(record.offering_key())
                .or_default()
                .push(score);
        }
    }

    let course_stats: HashMap<String, GroupStats> = course_scores
        .into_iter()
        .map(|(key, scores)| (key, GroupStats::from_scores(scores)))
        .collect();
    let offering_stats: HashMap<String, GroupStats> = offering_scores
        .into_iter()
        .map(|(key, scores)| (key, GroupStats::from_scores(scores)))
        .collect();

    records
        .into_iter()
        .map(|record| {
            let Some(score) = parse_score(&record.score) else {
                return MarkRecord::Unscored(record);
            };
            // Both partitions hold this record's own score, so the lookups
            // cannot miss.
            let offering = &offering_stats[&record.offering_key()];
            let course = &course_stats[&record.course];
            MarkRecord::Scored(ScoredRecord {
                session_average: offering.average_label(),
                session_rank: offering.rank_label(score),
                course_average: course.average_label(),
                course_rank: course.rank_label(score),
                course: record.course,
                year: record.year,
                session: record.session,
                id: record.id,
                firstname: record.firstname,
                lastname: record.lastname,
                score,
            })
        })
        .collect()
}
