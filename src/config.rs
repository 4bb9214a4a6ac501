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

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MAX_ADDITIONAL_CONNECTIONS: u32 = 2;

/// Above this many free (non must-keep) candidates, exhaustive selection
/// is replaced by a greedy heuristic.
pub const DEFAULT_MAX_EXHAUSTIVE_POOL: usize = 20;

pub const MAX_EXHAUSTIVE_POOL_ENV_VAR: &str = "FENRIR_MAX_EXHAUSTIVE_POOL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CullingConfig {
    /// A journey whose number of connections exceeds the reference journey's
    /// by more than this is tagged for deletion. Can be overriden per request.
    #[serde(default = "default_max_additional_connections")]
    pub max_additional_connections: u32,

    #[serde(default = "default_max_exhaustive_pool")]
    pub max_exhaustive_pool: usize,

    /// When true, journeys tagged `special_event` are filtered out.
    #[serde(default)]
    pub special_event_excluded: bool,
}

pub fn default_max_additional_connections() -> u32 {
    DEFAULT_MAX_ADDITIONAL_CONNECTIONS
}

pub fn default_max_exhaustive_pool() -> usize {
    read_env_var_from_os(MAX_EXHAUSTIVE_POOL_ENV_VAR, DEFAULT_MAX_EXHAUSTIVE_POOL)
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            max_additional_connections: default_max_additional_connections(),
            max_exhaustive_pool: default_max_exhaustive_pool(),
            special_event_excluded: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealTimeConfig {
    /// Whether disruptions may create trips absent from the base schedule.
    #[serde(default)]
    pub realtime_addition_enabled: bool,
}

fn read_env_var_from_os<T>(var_name: &str, default_value: T) -> T
where
    T: Debug + std::str::FromStr,
    T::Err: Display,
{
    parse_env_var(var_name, default_value, |s| s.parse())
}

// - var not set -> use default value
// - var set but non-unicode -> warn and use default value
// - var set but not parsable -> warn and use default value
pub fn parse_env_var<T, Parser, ParseErr>(var_name: &str, default_value: T, parser: Parser) -> T
where
    Parser: Fn(&str) -> Result<T, ParseErr>,
    ParseErr: Display,
    T: Debug,
{
    match std::env::var(var_name) {
        Ok(s) => match parser(&s) {
            Ok(val) => val,
            Err(err) => {
                warn!(
                    "Could not parse env var {} : {}. I'll use the default value '{:?}' instead",
                    var_name, err, default_value
                );
                default_value
            }
        },
        Err(std::env::VarError::NotPresent) => default_value,
        Err(std::env::VarError::NotUnicode(err)) => {
            warn!(
                "Badly formed env var {} : {:?}. I'll use the default value {:?} instead",
                var_name, err, default_value
            );
            default_value
        }
    }
}

// for infaillible parser
pub fn read_env_var<T, Parser>(var_name: &str, default_value: T, parser: Parser) -> T
where
    Parser: Fn(&str) -> T,
    T: Debug,
{
    parse_env_var(var_name, default_value, |s| -> Result<T, &'static str> {
        Ok(parser(s))
    })
}
