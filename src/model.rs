use crate::session::SessionState;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A catalogue entry. Empty strings stand for "not known" and are skipped
/// when rendering.
#[derive(Serialize, Debug, PartialEq)]
pub struct Movie {
    pub id: &'static str,
    pub title: &'static str,
    pub year: &'static str,
    pub duration: &'static str,
    pub rating: &'static str,
    pub description: &'static str,
    pub director: &'static str,
    pub cast: &'static str,
    pub genre: &'static str,
    pub release: &'static str,
    pub classification: &'static str,
    pub tags: &'static [&'static str],
    pub image: &'static str,
    pub trailer: &'static str,
}

impl Movie {
    /// Text shown under a card title; genre filters match against it.
    pub fn meta(&self) -> String {
        format!("{} • {}", self.year, self.genre)
    }
}

/// Everything stored for one visitor between requests.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Visit {
    pub session: SessionState,
    pub selected: Option<String>,
    pub notice: Option<String>,
}
