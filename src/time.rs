// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia

use chrono::{NaiveDate, NaiveDateTime};

pub const SECONDS_IN_A_DAY: i32 = 24 * 60 * 60;

// lower than 2^31 / SECONDS_IN_A_DAY, so conversions to/from datetimes
// never overflow an i32
pub const MAX_DAYS_OFFSET: i32 = 100;

/// Time of a scheduled stop, counted in seconds since midnight of the
/// trip's reference date. May exceed 24h for trips running past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecondsSinceDayStart {
    seconds: i32,
}

impl SecondsSinceDayStart {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub fn from_seconds_i64(seconds: i64) -> Option<Self> {
        let max = i64::from(MAX_DAYS_OFFSET) * i64::from(SECONDS_IN_A_DAY);
        if seconds < 0 || seconds > max {
            return None;
        }
        Some(Self {
            seconds: seconds as i32,
        })
    }

    pub fn total_seconds(&self) -> i32 {
        self.seconds
    }

    pub fn to_datetime(&self, reference_date: &NaiveDate) -> NaiveDateTime {
        reference_date.and_time(chrono::NaiveTime::MIN)
            + chrono::Duration::seconds(i64::from(self.seconds))
    }

    pub fn from_datetime(datetime: &NaiveDateTime, reference_date: &NaiveDate) -> Option<Self> {
        let midnight = reference_date.and_time(chrono::NaiveTime::MIN);
        let seconds = datetime.signed_duration_since(midnight).num_seconds();
        Self::from_seconds_i64(seconds)
    }
}

impl std::fmt::Display for SecondsSinceDayStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds / 60) % 60;
        let seconds = self.seconds % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

impl std::str::FromStr for SecondsSinceDayStart {
    type Err = TimeParseError;

    /// Parses "HH:MM:SS". Hours may exceed 24 for trips running past midnight.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mk_err = || TimeParseError {
            string: s.to_string(),
        };
        let mut fields = s.split(':');
        let hours: i64 = fields
            .next()
            .and_then(|h| h.parse().ok())
            .ok_or_else(mk_err)?;
        let minutes: i64 = fields
            .next()
            .and_then(|m| m.parse().ok())
            .ok_or_else(mk_err)?;
        let seconds: i64 = fields
            .next()
            .and_then(|sec| sec.parse().ok())
            .ok_or_else(mk_err)?;
        if fields.next().is_some() || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
            return Err(mk_err());
        }
        SecondsSinceDayStart::from_seconds_i64(hours * 3600 + minutes * 60 + seconds)
            .ok_or_else(mk_err)
    }
}

#[derive(Debug)]
pub struct TimeParseError {
    string: String,
}

impl std::error::Error for TimeParseError {}

impl std::fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse `{}` as a time. Expected format is HH:MM:SS.",
            self.string
        )
    }
}
