// NEO Database - Core Library
// Link near-Earth objects to their close approaches, look them up, query them

pub mod database;       // Linker + query engine
pub mod extract;        // CSV / JSON decoding
pub mod filters;        // Criteria → predicates
pub mod helpers;        // Date parsing and formatting
pub mod index;          // Lookup by designation / name
pub mod models;         // NearEarthObject, CloseApproach
pub mod write;          // CSV / JSON encoding

// Re-export commonly used types
pub use database::NeoDatabase;
pub use extract::{load_approaches, load_neos};
pub use filters::{
    create_filters, limit, ApproachFilter, AttributeFilter, Comparison, FilterCriteria, Predicate,
};
pub use helpers::{cd_to_datetime, datetime_to_str, parse_date};
pub use index::NeoIndex;
pub use models::{ApproachId, CloseApproach, LinkedApproach, NearEarthObject, NeoId};
pub use write::{write_to_csv, write_to_json};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
