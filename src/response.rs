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
// www.navitia.io

//! Value types exchanged with the routing engine boundary : journeys,
//! their sections, and the response envelope that carries them.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fallback/street mode of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Walking,
    Bike,
    Bss,
    Car,
    Ridesharing,
    Taxi,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Walking => write!(f, "walking"),
            Mode::Bike => write!(f, "bike"),
            Mode::Bss => write!(f, "bss"),
            Mode::Car => write!(f, "car"),
            Mode::Ridesharing => write!(f, "ridesharing"),
            Mode::Taxi => write!(f, "taxi"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = BadMode;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s {
            "walking" => Mode::Walking,
            "bike" => Mode::Bike,
            "bss" => Mode::Bss,
            "car" => Mode::Car,
            "ridesharing" => Mode::Ridesharing,
            "taxi" => Mode::Taxi,
            _ => {
                return Err(BadMode {
                    mode_name: s.to_string(),
                })
            }
        };
        Ok(mode)
    }
}

#[derive(Debug)]
pub struct BadMode {
    mode_name: String,
}

impl std::error::Error for BadMode {}

impl std::fmt::Display for BadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bad mode given : `{}`", self.mode_name)
    }
}

/// Whether a public transport section is built on the base schedule
/// or on a realtime-amended trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealTimeLevel {
    BaseSchedule,
    RealTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    StreetNetwork {
        mode: Mode,
    },
    PublicTransport {
        line_id: String,
        data_freshness: RealTimeLevel,
    },
    Transfer,
    CrowFly {
        mode: Mode,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl Section {
    pub fn street_network(mode: Mode) -> Self {
        Self {
            kind: SectionKind::StreetNetwork { mode },
            origin: None,
            destination: None,
        }
    }

    pub fn public_transport(line_id: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::PublicTransport {
                line_id: line_id.into(),
                data_freshness: RealTimeLevel::BaseSchedule,
            },
            origin: None,
            destination: None,
        }
    }

    pub fn crow_fly(mode: Mode) -> Self {
        Self {
            kind: SectionKind::CrowFly { mode },
            origin: None,
            destination: None,
        }
    }

    pub fn transfer() -> Self {
        Self {
            kind: SectionKind::Transfer,
            origin: None,
            destination: None,
        }
    }

    /// The street mode, for street network and crow fly sections.
    pub fn street_mode(&self) -> Option<Mode> {
        match &self.kind {
            SectionKind::StreetNetwork { mode } | SectionKind::CrowFly { mode } => Some(*mode),
            _ => None,
        }
    }

    pub fn is_street_network(&self) -> bool {
        matches!(self.kind, SectionKind::StreetNetwork { .. })
    }

    pub fn is_public_transport(&self) -> bool {
        matches!(self.kind, SectionKind::PublicTransport { .. })
    }

    pub fn line_id(&self) -> Option<&str> {
        match &self.kind {
            SectionKind::PublicTransport { line_id, .. } => Some(line_id.as_str()),
            _ => None,
        }
    }

    /// Dedup key of this section in the candidate matrix.
    /// Transfer sections do not contribute to coverage and have no signature.
    pub fn segment_signature(&self) -> Option<SegmentSignature> {
        match &self.kind {
            SectionKind::PublicTransport { line_id, .. } => {
                Some(SegmentSignature::Line(line_id.clone()))
            }
            SectionKind::StreetNetwork { mode } | SectionKind::CrowFly { mode } => {
                Some(SegmentSignature::Street(*mode))
            }
            SectionKind::Transfer => None,
        }
    }
}

/// Order-independent identifier of a transport network segment,
/// used to deduplicate sections across journeys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentSignature {
    Line(String),
    Street(Mode),
}

impl std::fmt::Display for SegmentSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentSignature::Line(line_id) => write!(f, "{}", line_id),
            SegmentSignature::Street(mode) => write!(f, "{}", mode),
        }
    }
}

/// Category assigned by the routing engine. The four special categories
/// exempt a journey from count-based culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyCategory {
    Rapid,
    Comfort,
    Best,
    NonPtBike,
    NonPtWalk,
    Untagged,
}

impl JourneyCategory {
    pub fn is_must_keep(&self) -> bool {
        matches!(
            self,
            JourneyCategory::Comfort
                | JourneyCategory::Best
                | JourneyCategory::NonPtBike
                | JourneyCategory::NonPtWalk
        )
    }
}

pub const TAG_TO_DELETE: &str = "to_delete";
pub const TAG_NON_PT: &str = "non_pt";
pub const TAG_SPECIAL_EVENT: &str = "special_event";
pub const DELETED_BECAUSE_TOO_MUCH_CONNECTIONS: &str = "deleted_because_too_much_connections";
pub const DELETED_BECAUSE_NON_CAR_TAGGED_JOURNEY_FILTERED: &str =
    "deleted_because_non_car_tagged_journey_filtered";
pub const DELETED_BECAUSE_SPECIAL_EVENT_JOURNEY_FILTERED: &str =
    "deleted_because_special_event_journey_filtered";
pub const DELETED_BECAUSE_DUPLICATE_JOURNEY: &str = "deleted_because_duplicate_journey";
pub const DELETED_BECAUSE_TOO_MUCH_JOURNEYS: &str = "deleted_because_too_much_journeys";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub sections: Vec<Section>,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub nb_transfers: i32,
    pub category: JourneyCategory,
    pub tags: BTreeSet<String>,
    /// Ids of the feed publishers whose data this journey is built on.
    pub feed_publishers: BTreeSet<String>,
}

impl Journey {
    pub fn new(departure: NaiveDateTime, arrival: NaiveDateTime) -> Self {
        Self {
            sections: Vec::new(),
            departure,
            arrival,
            nb_transfers: 0,
            category: JourneyCategory::Untagged,
            tags: BTreeSet::new(),
            feed_publishers: BTreeSet::new(),
        }
    }

    pub fn has_public_transport(&self) -> bool {
        self.sections.iter().any(Section::is_public_transport)
    }

    /// A direct path journey uses only the street network.
    pub fn is_direct_path(&self) -> bool {
        !self.sections.is_empty() && self.sections.iter().all(Section::is_street_network)
    }

    pub fn signatures(&self) -> BTreeSet<SegmentSignature> {
        self.sections
            .iter()
            .filter_map(Section::segment_signature)
            .collect()
    }

    pub fn tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Tags the journey for deletion. In debug mode the journey stays in the
    /// response with its deletion reason, otherwise it is removed at the end
    /// of the culling pipeline.
    pub fn mark_for_deletion(&mut self, reason: &str) {
        self.tags.insert(TAG_TO_DELETE.to_string());
        self.tags.insert(reason.to_string());
    }

    pub fn is_to_delete(&self) -> bool {
        self.tags.contains(TAG_TO_DELETE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorId {
    NoSolution,
    DateOutOfBounds,
    BadFormat,
    NoOriginNorDestination,
}

impl std::fmt::Display for ErrorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorId::NoSolution => write!(f, "no_solution"),
            ErrorId::DateOutOfBounds => write!(f, "date_out_of_bounds"),
            ErrorId::BadFormat => write!(f, "bad_format"),
            ErrorId::NoOriginNorDestination => write!(f, "no_origin_nor_destination"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    pub id: ErrorId,
    pub message: String,
}

/// Provenance of the data a response is built on, exposed to clients
/// for attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPublisher {
    pub id: String,
    pub name: String,
    pub license: Option<String>,
    pub url: Option<String>,
}

impl FeedPublisher {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            license: None,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Response {
    pub journeys: Vec<Journey>,
    pub error: Option<ResponseError>,
    pub feed_publishers: Vec<FeedPublisher>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_journeys(&self) -> bool {
        !self.journeys.is_empty()
    }
}
