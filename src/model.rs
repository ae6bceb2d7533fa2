use crate::{
    date::{serialize_canonical, serialize_canonical_opt},
    CrawlerError, MatchCandidate,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i64,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
    #[serde(serialize_with = "serialize_canonical_opt")]
    pub date: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_canonical")]
    pub created_at: DateTime<Utc>,
}

/// Fields of a match that is about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
    #[serde(serialize_with = "serialize_canonical_opt")]
    pub date: Option<DateTime<Utc>>,
}

impl NewMatch {
    /// Rules of the create and reset commands. Scraped matches skip them.
    pub fn validate(&self) -> Result<(), CrawlerError> {
        validate_name("homeTeamName", &self.home_team_name)?;
        validate_name("awayTeamName", &self.away_team_name)?;
        if self.home_team_score.is_none() {
            return Err(missing("homeTeamScore"));
        }
        if self.away_team_score.is_none() {
            return Err(missing("awayTeamScore"));
        }
        if self.date.is_none() {
            return Err(missing("date"));
        }
        Ok(())
    }
}

impl From<MatchCandidate> for NewMatch {
    fn from(c: MatchCandidate) -> Self {
        Self {
            home_team_name: c.home_team_name,
            away_team_name: c.away_team_name,
            home_team_score: c.home_team_score,
            away_team_score: c.away_team_score,
            date: c.date,
        }
    }
}

/// Partial update, `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    pub home_team_score: Option<u32>,
    pub away_team_score: Option<u32>,
    pub date: Option<DateTime<Utc>>,
}

impl MatchUpdate {
    pub fn validate(&self) -> Result<(), CrawlerError> {
        if let Some(name) = &self.home_team_name {
            validate_name("homeTeamName", name)?;
        }
        if let Some(name) = &self.away_team_name {
            validate_name("awayTeamName", name)?;
        }
        Ok(())
    }

    pub fn apply(self, m: &mut Match) {
        if let Some(v) = self.home_team_name {
            m.home_team_name = v;
        }
        if let Some(v) = self.away_team_name {
            m.away_team_name = v;
        }
        if let Some(v) = self.home_team_score {
            m.home_team_score = Some(v);
        }
        if let Some(v) = self.away_team_score {
            m.away_team_score = Some(v);
        }
        if let Some(v) = self.date {
            m.date = Some(v);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Exact instant; `At(None)` selects matches without a date.
    At(Option<DateTime<Utc>>),
    /// Any kickoff within the UTC calendar day.
    Day(NaiveDate),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilter {
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    /// Either side.
    pub team: Option<String>,
    pub date: Option<DateFilter>,
}

impl MatchFilter {
    pub fn natural_key(
        home_team_name: &str,
        away_team_name: &str,
        date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            home_team_name: Some(home_team_name.to_string()),
            away_team_name: Some(away_team_name.to_string()),
            team: None,
            date: Some(DateFilter::At(date)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * i64::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    #[serde(serialize_with = "serialize_canonical")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    pub country: Option<String>,
}

impl NewTeam {
    pub fn validate(&self) -> Result<(), CrawlerError> {
        validate_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub country: Option<String>,
}

impl TeamUpdate {
    pub fn validate(&self) -> Result<(), CrawlerError> {
        match &self.name {
            Some(name) => validate_name("name", name),
            None => Ok(()),
        }
    }

    pub fn apply(self, t: &mut Team) {
        if let Some(v) = self.name {
            t.name = v;
        }
        if let Some(v) = self.country {
            t.country = Some(v);
        }
    }
}

fn validate_name(field: &'static str, name: &str) -> Result<(), CrawlerError> {
    if name.trim().is_empty() {
        return Err(CrawlerError::Validation {
            field,
            reason: "must not be empty",
        });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CrawlerError::Validation {
            field,
            reason: "must be at most 30 characters",
        });
    }
    Ok(())
}

fn missing(field: &'static str) -> CrawlerError {
    CrawlerError::Validation {
        field,
        reason: "is required",
    }
}
