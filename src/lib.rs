//! Scrapes the eMarks grading application across its token-guarded page
//! navigations, rebuilds the per-student mark dataset, computes
//! peer-relative statistics (average and rank within a course and within a
//! course offering), and persists the result for browsing.

pub mod cli;
pub mod config;
pub mod data;
pub mod emarks;
pub mod logging;
pub mod scraper;
