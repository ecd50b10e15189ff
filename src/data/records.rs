//! Mark record types shared by the extraction pipeline, the aggregation
//! engine, and the record store.

use serde::{Deserialize, Serialize};

/// Academic session, encoded as a single digit in the source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Winter,
    Summer,
    Fall,
}

impl Session {
    /// Map the source system's single-digit session code.
    ///
    /// `1` is winter, `5` is summer, `9` is fall. Anything else is
    /// unrecognized and yields `None`.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '1' => Some(Self::Winter),
            '5' => Some(Self::Summer),
            '9' => Some(Self::Fall),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Summer => "summer",
            Self::Fall => "fall",
        }
    }
}

/// One scraped row: a single student's mark in a single course offering.
///
/// All fields are kept as scraped. `id` may carry leading zeros and must
/// never be numerically coerced. `score` stays a string until the
/// aggregation engine validates it; `session` holds the lowercase session
/// name, or the empty string when the session code was unrecognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub course: String,
    pub year: String,
    pub session: String,
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub score: String,
}

impl RawRecord {
    /// Grouping key for a specific offering of a course.
    ///
    /// The exact concatenation of course, year, and session, matching the
    /// key the source system's consumers expect.
    pub fn offering_key(&self) -> String {
        format!("{}{}{}", self.course, self.year, self.session)
    }
}

/// A record annotated with peer statistics by the aggregation engine.
///
/// Records whose score failed validation pass through as `Unscored` and
/// carry no averaging fields. Serialized untagged so the stored JSON shape
/// matches the column set downstream readers expect: `Scored` rows carry
/// `saverage`/`srank`/`caverage`/`crank`, `Unscored` rows just the raw
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkRecord {
    Scored(ScoredRecord),
    Unscored(RawRecord),
}

/// A validated record together with its peer statistics.
///
/// `saverage`/`srank` are scoped to the course offering (course+year+session)
/// and `caverage`/`crank` to the course across all offerings. Averages are
/// formatted to exactly two decimals, ranks as `"<rank> | <count>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub course: String,
    pub year: String,
    pub session: String,
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub score: u32,
    #[serde(rename = "saverage")]
    pub session_average: String,
    #[serde(rename = "srank")]
    pub session_rank: String,
    #[serde(rename = "caverage")]
    pub course_average: String,
    #[serde(rename = "crank")]
    pub course_rank: String,
}

impl MarkRecord {
    pub fn course(&self) -> &str {
        match self {
            Self::Scored(r) => &r.course,
            Self::Unscored(r) => &r.course,
        }
    }

    pub fn year(&self) -> &str {
        match self {
            Self::Scored(r) => &r.year,
            Self::Unscored(r) => &r.year,
        }
    }

    pub fn session(&self) -> &str {
        match self {
            Self::Scored(r) => &r.session,
            Self::Unscored(r) => &r.session,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Scored(r) => &r.id,
            Self::Unscored(r) => &r.id,
        }
    }

    pub fn firstname(&self) -> &str {
        match self {
            Self::Scored(r) => &r.firstname,
            Self::Unscored(r) => &r.firstname,
        }
    }

    pub fn lastname(&self) -> &str {
        match self {
            Self::Scored(r) => &r.lastname,
            Self::Unscored(r) => &r.lastname,
        }
    }

    /// The validated score, or `None` for records excluded from aggregation.
    pub fn score(&self) -> Option<u32> {
        match self {
            Self::Scored(r) => Some(r.score),
            Self::Unscored(_) => None,
        }
    }
}
