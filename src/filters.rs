// 🔎 Filters - criteria as data, predicates over close approaches
//
// FilterCriteria is what the user asks for (CLI flags or a JSON file).
// create_filters turns it into AttributeFilters, which NeoDatabase::query
// evaluates left to right against each LinkedApproach.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::LinkedApproach;

// ============================================================================
// FILTER TRAIT
// ============================================================================

/// A pure boolean test over a close approach and its owner
pub trait ApproachFilter {
    fn matches(&self, approach: &LinkedApproach<'_>) -> bool;
}

impl<T: ApproachFilter + ?Sized> ApproachFilter for Box<T> {
    fn matches(&self, approach: &LinkedApproach<'_>) -> bool {
        (**self).matches(approach)
    }
}

impl<T: ApproachFilter + ?Sized> ApproachFilter for &T {
    fn matches(&self, approach: &LinkedApproach<'_>) -> bool {
        (**self).matches(approach)
    }
}

/// Wraps any closure as a filter
///
/// ```
/// use neo_database::{LinkedApproach, Predicate};
/// let close = Predicate(|a: &LinkedApproach<'_>| a.distance < 0.05);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Predicate<F>(pub F);

impl<F> ApproachFilter for Predicate<F>
where
    F: Fn(&LinkedApproach<'_>) -> bool,
{
    fn matches(&self, approach: &LinkedApproach<'_>) -> bool {
        (self.0)(approach)
    }
}

// ============================================================================
// ATTRIBUTE FILTERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// value == bound
    Eq,
    /// value >= bound
    Ge,
    /// value <= bound
    Le,
}

impl Comparison {
    /// Apply the comparison. NaN never satisfies any of them.
    pub fn holds<T: PartialOrd>(&self, value: T, bound: T) -> bool {
        match self {
            Comparison::Eq => value == bound,
            Comparison::Ge => value >= bound,
            Comparison::Le => value <= bound,
        }
    }
}

/// Filter on one attribute of a close approach or of its NEO
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttributeFilter {
    /// Calendar date of the approach
    Date(Comparison, NaiveDate),

    /// Approach distance (au)
    Distance(Comparison, f64),

    /// Relative velocity (km/s)
    Velocity(Comparison, f64),

    /// NEO diameter (km); unknown diameters never match
    Diameter(Comparison, f64),

    /// NEO hazard flag
    Hazardous(bool),
}

impl ApproachFilter for AttributeFilter {
    fn matches(&self, approach: &LinkedApproach<'_>) -> bool {
        match *self {
            AttributeFilter::Date(op, date) => op.holds(approach.time.date(), date),
            AttributeFilter::Distance(op, bound) => op.holds(approach.distance, bound),
            AttributeFilter::Velocity(op, bound) => op.holds(approach.velocity, bound),
            // Unlinked approaches have no NEO and never match NEO filters
            AttributeFilter::Diameter(op, bound) => approach
                .neo()
                .map_or(false, |neo| op.holds(neo.diameter, bound)),
            AttributeFilter::Hazardous(wanted) => approach
                .neo()
                .map_or(false, |neo| neo.hazardous == wanted),
        }
    }
}

// ============================================================================
// CRITERIA
// ============================================================================

/// User criteria for a close-approach query
///
/// Every field is optional; an absent field adds no filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub velocity_min: Option<f64>,
    pub velocity_max: Option<f64>,
    pub diameter_min: Option<f64>,
    pub diameter_max: Option<f64>,
    pub hazardous: Option<bool>,
}

impl FilterCriteria {
    /// Load criteria from a JSON file
    ///
    /// ```json
    /// { "start_date": "2020-01-01", "distance_max": 0.1, "hazardous": true }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read criteria file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse criteria JSON")
    }

    /// Overlay `other` on top of `self`: fields set in `other` win
    pub fn merge(self, other: FilterCriteria) -> FilterCriteria {
        FilterCriteria {
            date: other.date.or(self.date),
            start_date: other.start_date.or(self.start_date),
            end_date: other.end_date.or(self.end_date),
            distance_min: other.distance_min.or(self.distance_min),
            distance_max: other.distance_max.or(self.distance_max),
            velocity_min: other.velocity_min.or(self.velocity_min),
            velocity_max: other.velocity_max.or(self.velocity_max),
            diameter_min: other.diameter_min.or(self.diameter_min),
            diameter_max: other.diameter_max.or(self.diameter_max),
            hazardous: other.hazardous.or(self.hazardous),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

/// Build the filters for a set of criteria
///
/// Order is fixed (dates, distance, velocity, diameter, hazard). Order never
/// changes the result set, only how early a failing approach is rejected.
pub fn create_filters(criteria: &FilterCriteria) -> Vec<AttributeFilter> {
    let candidates = [
        criteria.date.map(|d| AttributeFilter::Date(Comparison::Eq, d)),
        criteria.start_date.map(|d| AttributeFilter::Date(Comparison::Ge, d)),
        criteria.end_date.map(|d| AttributeFilter::Date(Comparison::Le, d)),
        criteria.distance_min.map(|v| AttributeFilter::Distance(Comparison::Ge, v)),
        criteria.distance_max.map(|v| AttributeFilter::Distance(Comparison::Le, v)),
        criteria.velocity_min.map(|v| AttributeFilter::Velocity(Comparison::Ge, v)),
        criteria.velocity_max.map(|v| AttributeFilter::Velocity(Comparison::Le, v)),
        criteria.diameter_min.map(|v| AttributeFilter::Diameter(Comparison::Ge, v)),
        criteria.diameter_max.map(|v| AttributeFilter::Diameter(Comparison::Le, v)),
        criteria.hazardous.map(AttributeFilter::Hazardous),
    ];

    candidates.into_iter().flatten().collect()
}

/// Cap a result stream at `n` items; `None` or `Some(0)` means no cap
pub fn limit<I: Iterator>(iterator: I, n: Option<usize>) -> std::iter::Take<I> {
    match n {
        Some(n) if n > 0 => iterator.take(n),
        _ => iterator.take(usize::MAX),
    }
}

// ============================================================================
// TESTS
// ============================================================================
