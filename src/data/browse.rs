//! Browsing state over the stored record set.
//!
//! Holds the loaded records plus the active filter and course selection as
//! one explicit state struct. Callers feed it events and redraw whichever
//! views the update reports back, so no rendering layer needs mutable
//! globals of its own.

use std::collections::BTreeSet;

use crate::data::records::MarkRecord;

/// Filter over the record list.
///
/// Selector fields match exactly when set; term fields are case-insensitive
/// substring matches and ignore empty terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub course: Option<String>,
    pub year: Option<String>,
    pub session: Option<String>,
    pub id_term: String,
    pub firstname_term: String,
    pub lastname_term: String,
}

impl RecordFilter {
    pub fn matches(&self, record: &MarkRecord) -> bool {
        fn selected(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().is_none_or(|f| f == value)
        }
        fn contains(value: &str, term: &str) -> bool {
            term.is_empty() || value.to_lowercase().contains(&term.to_lowercase())
        }

        selected(&self.course, record.course())
            && selected(&self.year, record.year())
            && selected(&self.session, record.session())
            && contains(record.id(), &self.id_term)
            && contains(record.firstname(), &self.firstname_term)
            && contains(record.lastname(), &self.lastname_term)
    }
}

/// Sorted unique values available for the selector filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub courses: Vec<String>,
    pub years: Vec<String>,
    pub sessions: Vec<String>,
}

/// Per-offering roll-up for a single course.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferingSummary {
    pub year: String,
    pub session: String,
    /// All students in the offering, scored or not.
    pub students: usize,
    /// Mean of valid scores, `None` when the offering has none.
    pub average: Option<f64>,
}

/// Headline numbers over the whole record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    pub total_records: usize,
    pub unique_students: usize,
    pub offerings: usize,
    pub courses: usize,
}

/// Which views a state update invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Filters,
    StudentTable,
    CourseTable,
    Stats,
}

/// State transitions driven by the hosting surface.
#[derive(Debug)]
pub enum BrowseEvent {
    RecordsLoaded {
        records: Vec<MarkRecord>,
        updated_at: Option<i64>,
    },
    FilterChanged(RecordFilter),
    CourseSelected(Option<String>),
}

#[derive(Debug, Default)]
pub struct BrowseState {
    records: Vec<MarkRecord>,
    updated_at: Option<i64>,
    filter: RecordFilter,
    selected_course: Option<String>,
}

impl BrowseState {
    /// Apply an event and report which views must be refreshed.
    pub fn update(&mut self, event: BrowseEvent) -> Vec<View> {
        match event {
            BrowseEvent::RecordsLoaded {
                records,
                updated_at,
            } => {
                self.records = records;
                self.updated_at = updated_at;
                vec![
                    View::Filters,
                    View::StudentTable,
                    View::CourseTable,
                    View::Stats,
                ]
            }
            BrowseEvent::FilterChanged(filter) => {
                self.filter = filter;
                vec![View::StudentTable]
            }
            BrowseEvent::CourseSelected(course) => {
                self.selected_course = course;
                vec![View::CourseTable]
            }
        }
    }

    pub fn records(&self) -> &[MarkRecord] {
        &self.records
    }

    pub fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    pub fn selected_course(&self) -> Option<&str> {
        self.selected_course.as_deref()
    }

    pub fn filtered_records(&self) -> Vec<&MarkRecord> {
        self.records
            .iter()
            .filter(|r| self.filter.matches(r))
            .collect()
    }

    pub fn filter_options(&self) -> FilterOptions {
        fn uniques<'a>(
            records: &'a [MarkRecord],
            field: impl Fn(&'a MarkRecord) -> &'a str,
        ) -> Vec<String> {
            records
                .iter()
                .map(field)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        FilterOptions {
            courses: uniques(&self.records, MarkRecord::course),
            years: uniques(&self.records, MarkRecord::year),
            sessions: uniques(&self.records, MarkRecord::session),
        }
    }

    /// Per-offering summaries for one course, newest year first, sessions
    /// in lexicographic order within a year. Offerings missing a year or
    /// session are left out.
    pub fn course_summaries(&self, course: &str) -> Vec<OfferingSummary> {
        let mut grouped: Vec<(String, String, usize, Vec<u32>)> = Vec::new();

        for record in self.records.iter().filter(|r| r.course() == course) {
            if record.year().is_empty() || record.session().is_empty() {
                continue;
            }
            let entry = grouped
                .iter_mut()
                .find(|(year, session, _, _)| year == record.year() && session == record.session());
            let entry = match entry {
                Some(entry) => entry,
                None => {
                    grouped.push((
                        record.year().to_string(),
                        record.session().to_string(),
                        0,
                        Vec::new(),
                    ));
                    grouped.last_mut().expect("entry just pushed")
                }
            };
            entry.2 += 1;
            if let Some(score) = record.score() {
                entry.3.push(score);
            }
        }

        let mut summaries: Vec<OfferingSummary> = grouped
            .into_iter()
            .map(|(year, session, students, scores)| OfferingSummary {
                year,
                session,
                students,
                average: mean(&scores),
            })
            .collect();

        summaries.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.session.cmp(&b.session)));
        summaries
    }

    /// Mean over all valid scores in the course, across offerings.
    pub fn course_average(&self, course: &str) -> Option<f64> {
        let scores: Vec<u32> = self
            .records
            .iter()
            .filter(|r| r.course() == course)
            .filter_map(MarkRecord::score)
            .collect();
        mean(&scores)
    }

    pub fn dataset_stats(&self) -> DatasetStats {
        let unique_students: BTreeSet<&str> = self
            .records
            .iter()
            .map(MarkRecord::id)
            .filter(|id| !id.is_empty())
            .collect();
        let offerings: BTreeSet<(&str, &str, &str)> = self
            .records
            .iter()
            .filter(|r| !r.course().is_empty() && !r.year().is_empty() && !r.session().is_empty())
            .map(|r| (r.course(), r.year(), r.session()))
            .collect();
        let courses: BTreeSet<&str> = self
            .records
            .iter()
            .map(MarkRecord::course)
            .filter(|c| !c.is_empty())
            .collect();

        DatasetStats {
            total_records: self.records.len(),
            unique_students: unique_students.len(),
            offerings: offerings.len(),
            courses: courses.len(),
        }
    }
}

fn mean(scores: &[u32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::augment;
    use crate::data::records::RawRecord;

    fn raw(course: &str, year: &str, session: &str, id: &str, score: &str) -> RawRecord {
        RawRecord {
            course: course.to_string(),
            year: year.to_string(),
            session: session.to_string(),
            id: id.to_string(),
            firstname: "Grace".to_string(),
            lastname: "Hopper".to_string(),
            score: score.to_string(),
        }
    }

    fn loaded_state(records: Vec<RawRecord>) -> BrowseState {
        let mut state = BrowseState::default();
        state.update(BrowseEvent::RecordsLoaded {
            records: augment(records),
            updated_at: Some(1_700_000_000_000),
        });
        state
    }

    #[test]
    fn test_records_loaded_refreshes_everything() {
        let mut state = BrowseState::default();
        let views = state.update(BrowseEvent::RecordsLoaded {
            records: Vec::new(),
            updated_at: None,
        });
        assert_eq!(
            views,
            vec![
                View::Filters,
                View::StudentTable,
                View::CourseTable,
                View::Stats
            ]
        );
    }

    #[test]
    fn test_filter_change_refreshes_student_table_only() {
        let mut state = loaded_state(vec![raw("CSC108", "2020", "summer", "1", "80")]);
        let views = state.update(BrowseEvent::FilterChanged(RecordFilter {
            course: Some("CSC108".to_string()),
            ..RecordFilter::default()
        }));
        assert_eq!(views, vec![View::StudentTable]);
        assert_eq!(state.filtered_records().len(), 1);
    }

    #[test]
    fn test_course_selection_refreshes_course_table() {
        let mut state = loaded_state(vec![raw("CSC108", "2020", "summer", "1", "80")]);
        let views = state.update(BrowseEvent::CourseSelected(Some("CSC108".to_string())));
        assert_eq!(views, vec![View::CourseTable]);
        assert_eq!(state.selected_course(), Some("CSC108"));
    }

    #[test]
    fn test_filter_exact_selectors() {
        let state = loaded_state(vec![
            raw("CSC108", "2020", "summer", "1", "80"),
            raw("CSC108", "2021", "winter", "2", "85"),
            raw("MAT137", "2020", "summer", "3", "90"),
        ]);
        let filter = RecordFilter {
            course: Some("CSC108".to_string()),
            year: Some("2020".to_string()),
            ..RecordFilter::default()
        };
        let matching: Vec<_> = state
            .records()
            .iter()
            .filter(|r| filter.matches(r))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id(), "1");
    }

    #[test]
    fn test_filter_terms_case_insensitive_substring() {
        let state = loaded_state(vec![raw("CSC108", "2020", "summer", "0012345", "80")]);
        let filter = RecordFilter {
            lastname_term: "hop".to_string(),
            id_term: "123".to_string(),
            ..RecordFilter::default()
        };
        assert!(filter.matches(&state.records()[0]));

        let miss = RecordFilter {
            firstname_term: "ada".to_string(),
            ..RecordFilter::default()
        };
        assert!(!miss.matches(&state.records()[0]));
    }

    #[test]
    fn test_filter_options_sorted_unique() {
        let state = loaded_state(vec![
            raw("MAT137", "2021", "winter", "1", "80"),
            raw("CSC108", "2020", "summer", "2", "85"),
            raw("CSC108", "2020", "summer", "3", "90"),
        ]);
        let options = state.filter_options();
        assert_eq!(options.courses, vec!["CSC108", "MAT137"]);
        assert_eq!(options.years, vec!["2020", "2021"]);
        assert_eq!(options.sessions, vec!["summer", "winter"]);
    }

    #[test]
    fn test_course_summaries_sorted_and_counted() {
        let state = loaded_state(vec![
            raw("CSC108", "2020", "summer", "1", "80"),
            raw("CSC108", "2020", "summer", "2", ""),
            raw("CSC108", "2021", "winter", "3", "90"),
            raw("CSC108", "2021", "fall", "4", "70"),
            raw("MAT137", "2020", "summer", "5", "60"),
        ]);
        let summaries = state.course_summaries("CSC108");

        assert_eq!(summaries.len(), 3);
        // Newest year first, sessions lexicographic within a year.
        assert_eq!((summaries[0].year.as_str(), summaries[0].session.as_str()), ("2021", "fall"));
        assert_eq!((summaries[1].year.as_str(), summaries[1].session.as_str()), ("2021", "winter"));
        assert_eq!((summaries[2].year.as_str(), summaries[2].session.as_str()), ("2020", "summer"));

        // Unscored students count toward the roster but not the average.
        assert_eq!(summaries[2].students, 2);
        assert_eq!(summaries[2].average, Some(80.0));
    }

    #[test]
    fn test_course_summaries_skip_incomplete_offerings() {
        let state = loaded_state(vec![raw("CSC108", "2020", "", "1", "80")]);
        assert!(state.course_summaries("CSC108").is_empty());
    }

    #[test]
    fn test_course_average_spans_offerings() {
        let state = loaded_state(vec![
            raw("CSC108", "2020", "summer", "1", "80"),
            raw("CSC108", "2021", "winter", "2", "90"),
            raw("CSC108", "2021", "winter", "3", ""),
        ]);
        assert_eq!(state.course_average("CSC108"), Some(85.0));
        assert_eq!(state.course_average("PHY151"), None);
    }

    #[test]
    fn test_dataset_stats() {
        let state = loaded_state(vec![
            raw("CSC108", "2020", "summer", "1", "80"),
            raw("CSC108", "2021", "winter", "1", "85"),
            raw("MAT137", "2020", "summer", "2", ""),
        ]);
        let stats = state.dataset_stats();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.unique_students, 2);
        assert_eq!(stats.offerings, 3);
        assert_eq!(stats.courses, 2);
    }
}
