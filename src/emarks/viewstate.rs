//! JSF ViewState token extraction.
//!
//! eMarks is a JavaServer Faces application: every stateful form submission
//! must echo back the server-issued `javax.faces.ViewState` token from the
//! page it targets, and tokens are presumed single-use.

use html_scraper::{Html, Selector};

/// Extract the hidden ViewState token from a marks page.
///
/// Checked by element id first, then by form-field name. An empty value
/// counts as missing either way. Returns `None` when no token is present,
/// which callers treat as "skip this submission", not a failure.
pub fn parse_view_state(html: &Html) -> Option<String> {
    let by_id = Selector::parse(r#"input[id="javax.faces.ViewState"]"#).unwrap();
    let by_name = Selector::parse(r#"input[name="javax.faces.ViewState"]"#).unwrap();

    let value_of = |selector: &Selector| {
        html.select(selector)
            .next()
            .and_then(|input| input.attr("value"))
            .filter(|value| !value.is_empty())
    };

    value_of(&by_id)
        .or_else(|| value_of(&by_name))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_state_by_id() {
        let html = Html::parse_document(
            r#"<html><body><form>
                <input type="hidden" id="javax.faces.ViewState" value="j_id42:token" />
            </form></body></html>"#,
        );
        assert_eq!(parse_view_state(&html), Some("j_id42:token".to_string()));
    }

    #[test]
    fn test_parse_view_state_by_name_fallback() {
        let html = Html::parse_document(
            r#"<html><body><form>
                <input type="hidden" name="javax.faces.ViewState" value="j_id7:token" />
            </form></body></html>"#,
        );
        assert_eq!(parse_view_state(&html), Some("j_id7:token".to_string()));
    }

    #[test]
    fn test_parse_view_state_id_wins_over_name() {
        let html = Html::parse_document(
            r#"<html><body><form>
                <input type="hidden" name="javax.faces.ViewState" value="by-name" />
                <input type="hidden" id="javax.faces.ViewState" value="by-id" />
            </form></body></html>"#,
        );
        assert_eq!(parse_view_state(&html), Some("by-id".to_string()));
    }

    #[test]
    fn test_parse_view_state_empty_id_value_falls_back_to_name() {
        let html = Html::parse_document(
            r#"<html><body><form>
                <input type="hidden" id="javax.faces.ViewState" value="" />
                <input type="hidden" name="javax.faces.ViewState" value="by-name" />
            </form></body></html>"#,
        );
        assert_eq!(parse_view_state(&html), Some("by-name".to_string()));
    }

    #[test]
    fn test_parse_view_state_missing() {
        let html = Html::parse_document("<html><body><form></form></body></html>");
        assert_eq!(parse_view_state(&html), None);
    }
}
