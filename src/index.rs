// 🗂️ NEO Index - lookups by designation and by name
//
// Built once, after linking, from owned snapshots of the linked NEOs.
// Lookups hand out clones of those snapshots: they are values, not views
// into the live database. Mutating a looked-up NEO never touches the
// database, and the database never touches a looked-up NEO.

use crate::models::NearEarthObject;

/// The three key forms a lookup accepts: as given, lower-cased, upper-cased
fn candidates(key: &str) -> [String; 3] {
    [key.to_string(), key.to_lowercase(), key.to_uppercase()]
}

/// Index over NEO snapshots, sorted by designation and by name
#[derive(Debug, Clone)]
pub struct NeoIndex {
    by_designation: Vec<NearEarthObject>,
    by_name: Vec<NearEarthObject>,
}

impl NeoIndex {
    /// Build both indices from the (already linked) NEO arena
    pub fn build(neos: &[NearEarthObject]) -> Self {
        let mut by_designation = neos.to_vec();
        by_designation.sort_by(|a, b| a.designation.cmp(&b.designation));

        // Stable sort over designation order: equal names keep designation order
        let mut by_name = by_designation.clone();
        by_name.sort_by(|a, b| a.name_key().cmp(b.name_key()));

        NeoIndex {
            by_designation,
            by_name,
        }
    }

    /// Find a NEO by primary designation (exact, lower-case or upper-case key)
    pub fn lookup_by_designation(&self, designation: &str) -> Option<NearEarthObject> {
        let position = candidates(designation)
            .iter()
            .filter_map(|candidate| {
                let at = self
                    .by_designation
                    .partition_point(|neo| neo.designation.as_str() < candidate.as_str());
                self.by_designation
                    .get(at)
                    .filter(|neo| neo.designation == *candidate)
                    .map(|_| at)
            })
            .min()?;

        self.by_designation.get(position).cloned()
    }

    /// Find a NEO by name (exact, lower-case or upper-case key)
    ///
    /// NEOs without a name are never returned, and neither the empty
    /// string nor a missing name is a valid key.
    pub fn lookup_by_name(&self, name: &str) -> Option<NearEarthObject> {
        if name.is_empty() {
            return None;
        }

        let position = candidates(name)
            .iter()
            .filter(|candidate| !candidate.is_empty())
            .filter_map(|candidate| {
                let at = self
                    .by_name
                    .partition_point(|neo| neo.name_key() < candidate.as_str());
                self.by_name
                    .get(at)
                    .filter(|neo| neo.name.as_deref() == Some(candidate.as_str()))
                    .map(|_| at)
            })
            .min()?;

        self.by_name.get(position).cloned()
    }

    /// Number of indexed NEOs
    pub fn len(&self) -> usize {
        self.by_designation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_designation.is_empty()
    }
}
