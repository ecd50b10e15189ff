//! Course page parsing: header metadata and the amendment marks table.

use html_scraper::{Html, Selector};
use tracing::warn;

use crate::data::records::{RawRecord, Session};

/// Course metadata parsed from the section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseMeta {
    pub course: String,
    pub year: String,
    pub session: String,
}

/// Parse course metadata from the `.section_header > span` text.
///
/// The header reads like `"CSC108H1 20205 Introduction to ..."`: the first
/// token minus its final two characters is the course code, the second
/// token's first four characters the year, and its fifth character the
/// session code. Short or missing tokens degrade to empty fields rather
/// than failing the page.
pub fn parse_course_meta(html: &Html) -> CourseMeta {
    let header_sel = Selector::parse(".section_header > span").unwrap();

    let text = html
        .select(&header_sel)
        .next()
        .map(|span| span.text().collect::<String>())
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        warn!("No section header found on course page");
    }

    let mut parts = text.split_whitespace();
    let code_token = parts.next().unwrap_or("");
    let term_token = parts.next().unwrap_or("");

    let session = term_token
        .chars()
        .nth(4)
        .and_then(Session::from_code)
        .map(|s| s.as_str().to_string())
        .unwrap_or_default();

    CourseMeta {
        course: strip_section_suffix(code_token).to_string(),
        year: term_token.chars().take(4).collect(),
        session,
    }
}

/// Drop the two-character section suffix from a course code token
/// (`"CSC108H1"` -> `"CSC108"`). Tokens shorter than two characters
/// collapse to the empty string.
fn strip_section_suffix(token: &str) -> &str {
    match token.char_indices().nth_back(1) {
        Some((idx, _)) => &token[..idx],
        None => "",
    }
}

/// Parse the amendment marks table into raw records, in table order.
///
/// The first row is the header and is skipped; rows without cells are
/// skipped; missing cells read as empty strings. A page without the table
/// yields zero rows.
pub fn parse_marks_rows(html: &Html, meta: &CourseMeta) -> Vec<RawRecord> {
    let table_sel = Selector::parse(r#"[id="enterMarksForm:amendmentList"]"#).unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let Some(table) = html.select(&table_sel).next() else {
        warn!(
            course = meta.course.as_str(),
            "No amendment table on course page"
        );
        return Vec::new();
    };

    let mut rows = Vec::new();
    for tr in table.select(&tr_sel).skip(1) {
        let cells: Vec<String> = tr
            .select(&td_sel)
            .map(|td| td.text().collect::<String>().trim().to_string())
            .collect();
        if cells.is_empty() {
            continue;
        }
        let cell = |index: usize| cells.get(index).cloned().unwrap_or_default();

        rows.push(RawRecord {
            course: meta.course.clone(),
            year: meta.year.clone(),
            session: meta.session.clone(),
            id: cell(1),
            lastname: cell(2),
            firstname: cell(3),
            score: cell(4),
        });
    }

    rows
}
