//! Rules that turn provider values into the canonical local fields.

use crate::model::matches::MatchStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-+").unwrap();
}

/// Lowercases, strips everything outside `[a-z0-9\s-]`, turns whitespace runs
/// into single hyphens and trims boundary hyphens. May return an empty string.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(stripped.trim(), "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Slug candidate for a team, falling back to `team-<external id>`.
pub fn team_slug_candidate(name: &str, external_team_id: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        format!("team-{external_team_id}")
    } else {
        slug
    }
}

/// The `n`th probe of the linear collision search: `slug`, `slug-1`, `slug-2`, ...
pub fn slug_probe(base: &str, attempt: usize) -> String {
    match attempt {
        0 => base.to_string(),
        n => format!("{base}-{n}"),
    }
}

impl MatchStatus {
    /// Maps a provider short status code. Unknown or missing codes count as
    /// scheduled.
    pub fn from_short_code(code: Option<&str>) -> MatchStatus {
        let code = match code {
            Some(code) => code.trim().to_ascii_uppercase(),
            None => return MatchStatus::Scheduled,
        };
        match code.as_str() {
            "NS" | "TBD" | "TBA" => MatchStatus::Scheduled,
            "1H" | "HT" | "2H" | "ET" | "BT" | "P" | "LIVE" => MatchStatus::Live,
            "FT" | "AET" | "PEN" => MatchStatus::Finished,
            "PST" | "SUSP" | "INT" => MatchStatus::Postponed,
            "CANC" | "ABD" | "AWD" | "WO" => MatchStatus::Cancelled,
            _ => MatchStatus::Scheduled,
        }
    }
}

/// Kick-off as a civil date and time of day in `tz`. Unparseable or missing
/// timestamps fall back to midnight of the civil `today`.
pub fn kickoff_in_zone(raw: Option<&str>, tz: Tz, today: NaiveDate) -> (NaiveDate, NaiveTime) {
    raw.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|kickoff| {
            let local = kickoff.with_timezone(&tz);
            (local.date_naive(), local.time())
        })
        .unwrap_or((today, NaiveTime::MIN))
}

/// Parses an `H:MM` / `HH:MM` daily update time.
pub fn parse_update_time(raw: &str) -> Option<NaiveTime> {
    let (hour, minute) = raw.trim().split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// The instant a civil date and time of day denote in `tz`.
pub fn civil_datetime(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Arsenal"), "arsenal");
        assert_eq!(slugify("  Manchester   United "), "manchester-united");
        assert_eq!(slugify("Brighton & Hove Albion"), "brighton-hove-albion");
        assert_eq!(slugify("--Paris -- SG--"), "paris-sg");
        assert_eq!(slugify("Górnik Zabrze"), "grnik-zabrze");
    }

    #[test]
    fn test_team_slug_falls_back_to_external_id() {
        assert_eq!(team_slug_candidate("???", "77"), "team-77");
        assert_eq!(team_slug_candidate("Legia", "77"), "legia");
    }

    #[test]
    fn test_slug_probe_sequence() {
        let probes: Vec<String> = (0..3).map(|n| slug_probe("arsenal", n)).collect();
        assert_eq!(probes, vec!["arsenal", "arsenal-1", "arsenal-2"]);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(MatchStatus::from_short_code(Some("NS")), MatchStatus::Scheduled);
        assert_eq!(MatchStatus::from_short_code(Some("1h")), MatchStatus::Live);
        assert_eq!(MatchStatus::from_short_code(Some("HT")), MatchStatus::Live);
        assert_eq!(MatchStatus::from_short_code(Some("PEN")), MatchStatus::Finished);
        assert_eq!(MatchStatus::from_short_code(Some("PST")), MatchStatus::Postponed);
        assert_eq!(MatchStatus::from_short_code(Some("CANC")), MatchStatus::Cancelled);
        assert_eq!(MatchStatus::from_short_code(Some("XYZ")), MatchStatus::Scheduled);
        assert_eq!(MatchStatus::from_short_code(None), MatchStatus::Scheduled);
    }

    #[test]
    fn test_kickoff_converted_to_civil_zone() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        // Summer time: UTC+2.
        let (date, time) = kickoff_in_zone(
            Some("2025-08-16T22:30:00+00:00"),
            chrono_tz::Europe::Warsaw,
            today,
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 17).unwrap());
        assert_eq!((time.hour(), time.minute()), (0, 30));

        // Winter time: UTC+1.
        let (date, time) = kickoff_in_zone(
            Some("2025-12-20T15:00:00+00:00"),
            chrono_tz::Europe::Warsaw,
            today,
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 20).unwrap());
        assert_eq!((time.hour(), time.minute()), (16, 0));
    }

    #[test]
    fn test_kickoff_fallback_is_today_midnight() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(
            kickoff_in_zone(Some("not a date"), chrono_tz::Europe::Warsaw, today),
            (today, NaiveTime::MIN)
        );
        assert_eq!(
            kickoff_in_zone(None, chrono_tz::Europe::Warsaw, today),
            (today, NaiveTime::MIN)
        );
    }

    #[test]
    fn test_parse_update_time() {
        assert_eq!(parse_update_time("08:05"), NaiveTime::from_hms_opt(8, 5, 0));
        assert_eq!(parse_update_time("9:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_update_time("24:00"), None);
        assert_eq!(parse_update_time("12:5"), None);
        assert_eq!(parse_update_time("noon"), None);
    }
}
