// ☄️ Entity Models - NearEarthObject + CloseApproach
// Identity is the designation; links are arena ids, never pointers
//
// Both collections live in the NeoDatabase arenas:
// - NearEarthObject.approaches → ApproachId into the approach arena
// - CloseApproach.neo          → NeoId into the NEO arena
// Link fields are crate-private: only the linker writes them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::helpers::datetime_to_str;

// ============================================================================
// ARENA IDS
// ============================================================================

/// Position of a NearEarthObject in the database's NEO arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NeoId(pub usize);

/// Position of a CloseApproach in the database's approach arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApproachId(pub usize);

// ============================================================================
// NEAR-EARTH OBJECT
// ============================================================================

/// A near-Earth object (NEO)
///
/// Identity: `designation` (unique, case-sensitive)
/// Values: name, diameter, hazard flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearEarthObject {
    /// Primary designation, e.g. "433" or "2020 AB"
    pub designation: String,

    /// IAU name, if any. `None` is distinct from an empty string.
    pub name: Option<String>,

    /// Diameter in kilometers, `NaN` when unknown
    pub diameter: f64,

    /// Potentially hazardous asteroid flag
    pub hazardous: bool,

    /// Close approaches of this NEO, in the order they were supplied
    #[serde(default)]
    pub(crate) approaches: Vec<ApproachId>,
}

impl NearEarthObject {
    /// Create an unlinked NEO
    pub fn new(designation: String, name: Option<String>, diameter: f64, hazardous: bool) -> Self {
        NearEarthObject {
            designation,
            name,
            diameter,
            hazardous,
            approaches: Vec::new(),
        }
    }

    /// "433 (Eros)" when named, plain designation otherwise
    pub fn fullname(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{} ({})", self.designation, name),
            _ => self.designation.clone(),
        }
    }

    /// Ids of the linked close approaches
    pub fn approach_ids(&self) -> &[ApproachId] {
        &self.approaches
    }

    /// Check if the linker has attached anything to this NEO
    pub fn is_linked(&self) -> bool {
        !self.approaches.is_empty()
    }

    /// Ordering key for the by-name index: absent names sort as ""
    pub(crate) fn name_key(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl PartialEq for NearEarthObject {
    fn eq(&self, other: &Self) -> bool {
        // NaN diameters compare equal here so snapshots stay equal to themselves
        let same_diameter = self.diameter == other.diameter
            || (self.diameter.is_nan() && other.diameter.is_nan());

        self.designation == other.designation
            && self.name == other.name
            && same_diameter
            && self.hazardous == other.hazardous
            && self.approaches == other.approaches
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diameter = if self.diameter.is_nan() {
            "an unknown diameter".to_string()
        } else {
            format!("a diameter of {:.3} km", self.diameter)
        };
        let hazard = if self.hazardous { "is" } else { "is not" };

        write!(
            f,
            "NEO {} has {} and {} potentially hazardous.",
            self.fullname(),
            diameter,
            hazard
        )
    }
}

// ============================================================================
// CLOSE APPROACH
// ============================================================================

/// A single close approach of a NEO to Earth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseApproach {
    /// Foreign key: designation of the NEO making the approach
    pub designation: String,

    /// Time of closest approach (UTC)
    pub time: NaiveDateTime,

    /// Nominal approach distance in astronomical units
    pub distance: f64,

    /// Velocity relative to Earth in km/s
    pub velocity: f64,

    /// Owning NEO, set once by the linker
    #[serde(default)]
    pub(crate) neo: Option<NeoId>,
}

impl CloseApproach {
    /// Create an unlinked close approach
    pub fn new(designation: String, time: NaiveDateTime, distance: f64, velocity: f64) -> Self {
        CloseApproach {
            designation,
            time,
            distance,
            velocity,
            neo: None,
        }
    }

    /// Owning NEO id, if this approach was linked
    pub fn neo_id(&self) -> Option<NeoId> {
        self.neo
    }

    /// Approach time as "YYYY-MM-DD HH:MM"
    pub fn time_str(&self) -> String {
        datetime_to_str(&self.time)
    }
}

// ============================================================================
// LINKED VIEW
// ============================================================================

/// A close approach together with its resolved owner
///
/// This is what queries yield and what filters and writers consume.
#[derive(Debug, Clone, Copy)]
pub struct LinkedApproach<'a> {
    approach: &'a CloseApproach,
    neo: Option<&'a NearEarthObject>,
}

impl<'a> LinkedApproach<'a> {
    pub(crate) fn new(approach: &'a CloseApproach, neo: Option<&'a NearEarthObject>) -> Self {
        LinkedApproach { approach, neo }
    }

    pub fn approach(&self) -> &'a CloseApproach {
        self.approach
    }

    /// Owning NEO, `None` for unlinked approaches
    pub fn neo(&self) -> Option<&'a NearEarthObject> {
        self.neo
    }
}

impl std::ops::Deref for LinkedApproach<'_> {
    type Target = CloseApproach;

    fn deref(&self) -> &CloseApproach {
        self.approach
    }
}

impl fmt::Display for LinkedApproach<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fullname = match self.neo {
            Some(neo) => neo.fullname(),
            None => self.approach.designation.clone(),
        };

        write!(
            f,
            "At {}, '{}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.approach.time_str(),
            fullname,
            self.approach.distance,
            self.approach.velocity
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
