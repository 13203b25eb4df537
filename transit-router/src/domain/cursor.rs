//! Resumable page cursors.
//!
//! A cursor records the time window the next (or previous) page should
//! search. It is handed to callers as an opaque URL-safe token.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Error decoding a page cursor token.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("page cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("page cursor content is malformed: {0}")]
    Content(#[from] serde_json::Error),

    #[error("page cursor has a negative search window")]
    NegativeWindow,
}

/// Which way a cursor pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Next,
    Previous,
}

/// The search window of a follow-up page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub kind: PageKind,
    pub earliest_departure_time: DateTime<FixedOffset>,
    /// Set only when the follow-up search is an arrive-by search.
    pub latest_arrival_time: Option<DateTime<FixedOffset>>,
    search_window_secs: i64,
}

impl PageCursor {
    pub fn new(
        kind: PageKind,
        earliest_departure_time: DateTime<FixedOffset>,
        latest_arrival_time: Option<DateTime<FixedOffset>>,
        search_window: Duration,
    ) -> Self {
        Self {
            kind,
            earliest_departure_time,
            latest_arrival_time,
            search_window_secs: search_window.num_seconds(),
        }
    }

    pub fn search_window(&self) -> Duration {
        Duration::seconds(self.search_window_secs)
    }

    /// Encode as an opaque token.
    pub fn encode(&self) -> String {
        // Serializing plain data into a Vec cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by [`PageCursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
        let cursor: PageCursor = serde_json::from_slice(&bytes)?;
        if cursor.search_window_secs < 0 {
            return Err(CursorError::NegativeWindow);
        }
        Ok(cursor)
    }
}
