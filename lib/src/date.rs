// Copyright 2026 The Relic Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Commit date rendering.

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::TimeZone as _;
use chrono::Utc;

/// How [`show_date`] renders a timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateMode {
    /// `Thu Apr 7 15:13:13 2005 +0200`
    #[default]
    Normal,
    /// `Thu, 7 Apr 2005 15:13:13 +0200`
    Rfc2822,
    /// `6 minutes ago`
    Relative,
    /// `2005-04-07 15:13:13 +0200`
    Iso8601,
}

/// Renders `seconds` since the epoch in `mode`. `tz` is the commit's UTC
/// offset in the `±HHMM` convention of the ident lines.
pub fn show_date(seconds: u64, tz: i32, mode: DateMode) -> String {
    match mode {
        DateMode::Relative => relative_date(seconds, Utc::now().timestamp()),
        DateMode::Normal => calendar_date(seconds, tz, "%a %b %-d %H:%M:%S %Y"),
        DateMode::Rfc2822 => calendar_date(seconds, tz, "%a, %-d %b %Y %H:%M:%S"),
        DateMode::Iso8601 => calendar_date(seconds, tz, "%Y-%m-%d %H:%M:%S"),
    }
}

fn calendar_date(seconds: u64, tz: i32, format: &str) -> String {
    match to_datetime(seconds, tz) {
        // An out-of-range timestamp falls back to the raw second count.
        None => seconds.to_string(),
        Some(datetime) => format!("{} {tz:+05}", datetime.format(format)),
    }
}

fn to_datetime(seconds: u64, tz: i32) -> Option<DateTime<FixedOffset>> {
    let seconds = i64::try_from(seconds).ok()?;
    let utc = match Utc.timestamp_opt(seconds, 0) {
        chrono::LocalResult::Single(utc) => utc,
        _ => return None,
    };
    let offset_seconds = ((tz / 100) * 60 + (tz % 100)) * 60;
    let offset =
        FixedOffset::east_opt(offset_seconds).unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
    Some(utc.with_timezone(&offset))
}

/// Renders the distance from `now` back to `seconds` in coarse human units.
fn relative_date(seconds: u64, now: i64) -> String {
    let then = i64::try_from(seconds).unwrap_or(i64::MAX);
    if then > now {
        return "in the future".to_string();
    }
    let diff = (now - then) as u64;
    if diff < 90 {
        return format!("{diff} seconds ago");
    }
    // Turn it into minutes
    let diff = (diff + 30) / 60;
    if diff < 90 {
        return format!("{diff} minutes ago");
    }
    // Turn it into hours
    let diff = (diff + 30) / 60;
    if diff < 36 {
        return format!("{diff} hours ago");
    }
    // We deal with number of days from here on
    let diff = (diff + 12) / 24;
    if diff < 14 {
        return format!("{diff} days ago");
    }
    // Say weeks for the past 10 weeks or so
    if diff < 70 {
        return format!("{} weeks ago", (diff + 3) / 7);
    }
    // Say months for the past 12 months or so
    if diff < 360 {
        return format!("{} months ago", (diff + 15) / 30);
    }
    // Give years and months for 5 years or so
    let total_months = (diff * 12 * 2 + 365) / (365 * 2);
    let years = total_months / 12;
    let months = total_months % 12;
    if months > 0 {
        format!("{years} years, {months} months ago")
    } else {
        format!("{years} years ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2005-04-07 15:13:13 UTC
    const EPOCH: u64 = 1112886793;

    #[test]
    fn test_normal_date() {
        assert_eq!(
            show_date(EPOCH, 0, DateMode::Normal),
            "Thu Apr 7 15:13:13 2005 +0000"
        );
        assert_eq!(
            show_date(EPOCH, 200, DateMode::Normal),
            "Thu Apr 7 17:13:13 2005 +0200"
        );
        assert_eq!(
            show_date(EPOCH, -730, DateMode::Normal),
            "Thu Apr 7 07:43:13 2005 -0730"
        );
    }

    #[test]
    fn test_rfc2822_date() {
        assert_eq!(
            show_date(EPOCH, 200, DateMode::Rfc2822),
            "Thu, 7 Apr 2005 17:13:13 +0200"
        );
    }

    #[test]
    fn test_iso8601_date() {
        assert_eq!(
            show_date(EPOCH, 0, DateMode::Iso8601),
            "2005-04-07 15:13:13 +0000"
        );
    }

    #[test]
    fn test_out_of_range_falls_back_to_seconds() {
        assert_eq!(show_date(u64::MAX, 0, DateMode::Normal), u64::MAX.to_string());
    }

    #[test]
    fn test_relative_date() {
        let now = 1_000_000_000_i64;
        let at = |ago: u64| now as u64 - ago;
        assert_eq!(relative_date(at(5), now), "5 seconds ago");
        assert_eq!(relative_date(at(600), now), "10 minutes ago");
        assert_eq!(relative_date(at(6 * 3600), now), "6 hours ago");
        assert_eq!(relative_date(at(3 * 86400), now), "3 days ago");
        assert_eq!(relative_date(at(21 * 86400), now), "3 weeks ago");
        assert_eq!(relative_date(at(90 * 86400), now), "3 months ago");
        assert_eq!(relative_date(at(730 * 86400), now), "2 years ago");
        assert_eq!(relative_date(now as u64 + 100, now), "in the future");
    }
}
