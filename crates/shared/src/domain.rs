use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// TMDB identifier as it appears on the page. The catalog endpoint sends it as
/// a JSON number, the page and the list endpoints as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TmdbId(pub String);

impl TmdbId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TmdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TmdbId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => TmdbId(n.to_string()),
            Raw::Text(s) => TmdbId::new(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMembership {
    OnList,
    NotOnList,
}

/// Film identity read from the hidden fields of a movie page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRef {
    pub tmdb_id: TmdbId,
    pub title: String,
    /// Zero when the page carries no usable year.
    pub year: i32,
    pub release_date: String,
    pub original_title: String,
}

impl FilmRef {
    /// Year used for review lookups: the page year, or the year of the release
    /// date when the page year is missing.
    pub fn release_year(&self) -> i32 {
        if self.year > 0 {
            return self.year;
        }
        NaiveDate::parse_from_str(self.release_date.trim(), "%Y-%m-%d")
            .map(|date| date.year())
            .unwrap_or(0)
    }
}

/// Lenient year parsing: blank or non-numeric input reads as zero.
pub fn parse_year(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub tmdb_id: TmdbId,
    pub title: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: i32,
    #[serde(default)]
    pub directors: Vec<String>,
}

fn lenient_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => i32::try_from(n).unwrap_or(0),
        Raw::Text(s) => parse_year(&s),
        Raw::Null(()) => 0,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogListing {
    pub results: Vec<CatalogRow>,
    pub num_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub title: String,
    pub original_title: String,
    pub release_year: i32,
    pub release_date: String,
}

impl From<&FilmRef> for ReviewRequest {
    fn from(film: &FilmRef) -> Self {
        Self {
            title: film.title.clone(),
            original_title: film.original_title.clone(),
            release_year: film.release_year(),
            release_date: film.release_date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewResult {
    Found {
        review_text: String,
        critics_pick: bool,
        publication_date: String,
        review_warning: bool,
    },
    NotFound {
        message: String,
    },
}
