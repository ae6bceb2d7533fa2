use crate::CrawlerError;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc};
use serde::Serializer;

const MONTHS: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Turns the French day headers of the results table (`Mardi 03 août 2021`)
/// plus a kickoff time (`21:00`) into UTC instants.
///
/// Header times are wall-clock times of the site, read in `offset`.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    offset: FixedOffset,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl DateNormalizer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn normalize(&self, header: &str, time: &str) -> Result<DateTime<Utc>, CrawlerError> {
        let fail = |reason| CrawlerError::DateParse {
            header: header.to_string(),
            time: time.to_string(),
            reason,
        };

        // The weekday carries nothing the date does not.
        let tokens = header.split_whitespace().skip(1).collect::<Vec<_>>();
        let [day, month, year] = tokens[..] else {
            return Err(fail("expected `<weekday> <day> <month> <year>`"));
        };
        let month = month_index(month).ok_or_else(|| fail("unknown month name"))?;
        let day = if day == "1er" { "1" } else { day };

        let local = NaiveDateTime::parse_from_str(
            &format!("{} {:02} {} {}", year, month, day, time.trim()),
            "%Y %m %d %H:%M",
        )
        .map_err(|_| fail("not a calendar date and time"))?;

        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|d| d.with_timezone(&Utc))
            .ok_or_else(|| fail("ambiguous local time"))
    }
}

/// 1-based month of a lowercase, accented French month name.
pub fn month_index(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

/// Canonical textual form of an instant, e.g. `2021-08-03T21:00:00.000Z`.
pub fn to_canonical(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serialize_with` helper writing instants with [`to_canonical`].
pub fn serialize_canonical<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_canonical(date))
}

pub fn serialize_canonical_opt<S: Serializer>(
    date: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serialize_canonical(date, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchCandidate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_summer_header() {
        let date = DateNormalizer::default()
            .normalize("Mardi 03 août 2021", "21:00")
            .expect("Valid header");
        assert_eq!(to_canonical(&date), "2021-08-03T21:00:00.000Z");
    }

    #[test]
    fn test_normalize_december_header() {
        let date = DateNormalizer::default()
            .normalize("Lundi 15 décembre 2022", "15:30")
            .expect("Valid header");
        assert_eq!(to_canonical(&date), "2022-12-15T15:30:00.000Z");
    }

    #[test]
    fn test_normalize_applies_site_offset() {
        let paris_winter = FixedOffset::east_opt(3600).expect("Valid offset");
        let date = DateNormalizer::new(paris_winter)
            .normalize("Mercredi 02 novembre 2022", "21:00")
            .expect("Valid header");
        assert_eq!(to_canonical(&date), "2022-11-02T20:00:00.000Z");
    }

    #[test]
    fn test_normalize_first_of_month() {
        let date = DateNormalizer::default()
            .normalize("Samedi 1er octobre 2022", "18:45")
            .expect("Valid header");
        assert_eq!(to_canonical(&date), "2022-10-01T18:45:00.000Z");
    }

    #[test]
    fn test_misencoded_month_is_rejected() {
        let res = DateNormalizer::default().normalize("Mardi 03 aoÃ»t 2021", "21:00");
        assert!(matches!(res, Err(CrawlerError::DateParse { .. })));
    }

    #[test]
    fn test_month_lookup_is_case_sensitive() {
        assert_eq!(month_index("Août"), None);
        assert_eq!(month_index("août"), Some(8));
        assert_eq!(month_index("janvier"), Some(1));
        assert_eq!(month_index("décembre"), Some(12));
    }

    #[test]
    fn test_candidate_json_uses_canonical_date() {
        let date = DateNormalizer::default()
            .normalize("Mardi 03 août 2021", "21:00")
            .expect("Valid header");
        let candidate = MatchCandidate {
            home_team_name: "Benfica".to_string(),
            away_team_name: "Spartak Moscou".to_string(),
            home_team_score: Some(2),
            away_team_score: Some(0),
            date: Some(date),
        };
        let json = serde_json::to_value(&candidate).expect("Serializable");
        assert_eq!(json["date"], "2021-08-03T21:00:00.000Z");

        let undated = MatchCandidate {
            date: None,
            ..candidate
        };
        let json = serde_json::to_value(&undated).expect("Serializable");
        assert!(json["date"].is_null());
    }

    #[test]
    fn test_invalid_calendar_date_is_rejected() {
        let normalizer = DateNormalizer::default();
        assert!(normalizer.normalize("Lundi 31 février 2022", "20:00").is_err());
        assert!(normalizer.normalize("Lundi 14 février 2022", "Reporté").is_err());
        assert!(normalizer.normalize("14 février 2022", "20:00").is_err());
    }
}
