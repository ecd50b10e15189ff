//! Amendment-row enumeration and course-selection form payloads.

use html_scraper::{Html, Selector};

/// Collect the element ids of every Amend control on the marks page, in
/// document order. Controls without an id are skipped.
///
/// Each Amend control marks one student-course row eligible for mark entry;
/// submitting its id navigates the session to that row's course page.
pub fn amendment_control_ids(html: &Html) -> Vec<String> {
    let sel = Selector::parse(r#"input[value="Amend"]"#).unwrap();
    html.select(&sel)
        .filter_map(|input| input.attr("id"))
        .map(str::to_string)
        .collect()
}

/// Build the form-encoded payload for one course-selection submission.
///
/// Fixed JSF plumbing keys plus the control id echoed as both key and
/// value, which is how the server identifies the clicked row.
pub fn build_submission(view_state: &str, control_id: &str) -> Vec<(String, String)> {
    vec![
        ("AJAXREQUEST".to_string(), "_viewRoot".to_string()),
        (
            "selectFilteredCourse".to_string(),
            "selectFilteredCourse".to_string(),
        ),
        ("javax.faces.ViewState".to_string(), view_state.to_string()),
        (control_id.to_string(), control_id.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amendment_control_ids_document_order() {
        let html = Html::parse_document(
            r#"<html><body><form>
                <input type="submit" id="form:row0:amend" value="Amend" />
                <input type="submit" id="form:row1:amend" value="Amend" />
                <input type="submit" id="form:save" value="Save" />
                <input type="submit" id="form:row2:amend" value="Amend" />
            </form></body></html>"#,
        );
        assert_eq!(
            amendment_control_ids(&html),
            vec!["form:row0:amend", "form:row1:amend", "form:row2:amend"]
        );
    }

    #[test]
    fn test_amendment_control_without_id_skipped() {
        let html = Html::parse_document(
            r#"<html><body><form>
                <input type="submit" value="Amend" />
                <input type="submit" id="form:row1:amend" value="Amend" />
            </form></body></html>"#,
        );
        assert_eq!(amendment_control_ids(&html), vec!["form:row1:amend"]);
    }

    #[test]
    fn test_no_amend_controls_yields_empty() {
        let html = Html::parse_document(
            r#"<html><body><form><input type="submit" id="x" value="Save" /></form></body></html>"#,
        );
        assert!(amendment_control_ids(&html).is_empty());
    }

    #[test]
    fn test_build_submission_payload() {
        let params = build_submission("j_id42:token", "form:row0:amend");
        assert_eq!(
            params,
            vec![
                ("AJAXREQUEST".to_string(), "_viewRoot".to_string()),
                (
                    "selectFilteredCourse".to_string(),
                    "selectFilteredCourse".to_string()
                ),
                (
                    "javax.faces.ViewState".to_string(),
                    "j_id42:token".to_string()
                ),
                ("form:row0:amend".to_string(), "form:row0:amend".to_string()),
            ]
        );
    }
}
