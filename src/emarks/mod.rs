//! eMarks site client.
//!
//! eMarks is a JavaServer Faces application with session-bound ViewState
//! tokens. Reaching a course page takes a multi-step navigation: fetch a
//! fresh token from the marks page, POST a token-guarded course selection,
//! and follow the redirect target by hand. Redirects are never followed
//! automatically so the `Location` header stays observable.

pub mod course;
pub mod errors;
pub mod navigation;
pub mod viewstate;

use anyhow::Context;
use html_scraper::Html;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use crate::data::records::RawRecord;
pub use errors::EmarksError;

/// Client for the eMarks marks-amendment workflow.
///
/// Carries the already-authenticated session: the configured session cookie
/// is attached to every request, and any cookies the server sets along the
/// way are kept in the cookie store.
pub struct EmarksClient {
    http: reqwest::Client,
    marks_url: Url,
}

impl EmarksClient {
    pub fn new(marks_url: Url, session_cookie: Option<String>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            headers.insert(
                header::COOKIE,
                HeaderValue::from_str(&cookie).context("Session cookie is not a valid header")?,
            );
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, marks_url })
    }

    /// GET the main marks page and return its body.
    ///
    /// A redirect here means the session no longer reaches the marks page,
    /// which the site only does for unauthenticated visitors.
    pub async fn fetch_marks_page(&self) -> Result<String, EmarksError> {
        let resp = self
            .http
            .get(self.marks_url.clone())
            .send()
            .await
            .context("Failed to GET marks page")?;

        if resp.status().is_redirection() {
            let target = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<no location>");
            return Err(EmarksError::InvalidSession(format!(
                "marks page redirected to {target}"
            )));
        }

        let body = resp
            .text()
            .await
            .context("Failed to read marks page body")?;
        Ok(body)
    }

    /// Fetch a fresh ViewState token from the marks page.
    ///
    /// `Ok(None)` means the page carried no token; callers skip the
    /// submission that needed it rather than failing the run.
    pub async fn fetch_view_state(&self) -> Result<Option<String>, EmarksError> {
        let body = self.fetch_marks_page().await?;
        let html = Html::parse_document(&body);
        Ok(viewstate::parse_view_state(&html))
    }

    /// Resolve every Amend control on the given marks-page snapshot into
    /// the course page URL its submission redirects to.
    ///
    /// Controls are processed one at a time, each with a freshly fetched
    /// token, since tokens are session-bound and presumed single-use. A
    /// missing token or missing redirect header drops that control from the
    /// output; an empty result is valid and simply means zero rows.
    pub async fn resolve_amendment_urls(
        &self,
        page_html: &str,
    ) -> Result<Vec<Url>, EmarksError> {
        let control_ids = {
            let html = Html::parse_document(page_html);
            navigation::amendment_control_ids(&html)
        };
        debug!(controls = control_ids.len(), "Found Amend controls");

        let mut urls = Vec::new();
        for control_id in control_ids {
            let view_state = match self.fetch_view_state().await? {
                Some(token) => token,
                None => {
                    warn!(
                        control_id = control_id.as_str(),
                        "No ViewState on marks page, skipping control"
                    );
                    continue;
                }
            };

            let params = navigation::build_submission(&view_state, &control_id);
            let resp = self
                .http
                .post(self.marks_url.clone())
                .header(header::ACCEPT, "application/xhtml+xml, text/html")
                .form(&params)
                .send()
                .await
                .context("Failed to POST course selection")?;

            let location = match resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
            {
                Some(location) => location.to_string(),
                None => {
                    warn!(
                        control_id = control_id.as_str(),
                        status = resp.status().as_u16(),
                        "No redirect target for course selection, skipping control"
                    );
                    continue;
                }
            };

            match self.marks_url.join(&location) {
                Ok(url) => urls.push(url),
                Err(e) => warn!(
                    control_id = control_id.as_str(),
                    location = location.as_str(),
                    error = %e,
                    "Unresolvable redirect target, skipping control"
                ),
            }
        }

        Ok(urls)
    }

    /// Fetch one resolved course page and parse its rows.
    pub async fn fetch_course_rows(&self, url: &Url) -> Result<Vec<RawRecord>, EmarksError> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .context("Failed to GET course page")?;

        if resp.status().is_redirection() {
            return Err(EmarksError::InvalidSession(format!(
                "course page {url} redirected"
            )));
        }

        let body = resp
            .text()
            .await
            .context("Failed to read course page body")?;

        let html = Html::parse_document(&body);
        let meta = course::parse_course_meta(&html);
        let rows = course::parse_marks_rows(&html, &meta);
        debug!(
            url = %url,
            course = meta.course.as_str(),
            rows = rows.len(),
            "Parsed course page"
        );
        Ok(rows)
    }
}
