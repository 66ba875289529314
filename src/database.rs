// 🛰️ NEO Database - link, index, query
//
// NeoDatabase owns two arenas (NEOs and close approaches) in the order they
// were supplied. Construction links them once (sort-then-merge on the
// designation), then builds the lookup index from snapshots of the linked
// NEOs. After that everything is read-only.

use anyhow::{bail, ensure, Result};
use tracing::{debug, info};

use crate::filters::ApproachFilter;
use crate::index::NeoIndex;
use crate::models::{ApproachId, CloseApproach, LinkedApproach, NearEarthObject, NeoId};

// ============================================================================
// LINKER
// ============================================================================

/// Link every close approach to the NEO with the same designation
///
/// Sorts id permutations of both arenas (the arenas keep their order), then
/// walks them with two cursors. Stable sorts keep each NEO's approaches in
/// supplied order. Approaches without a matching NEO stay unlinked.
///
/// Returns the number of linked approaches.
fn link(neos: &mut [NearEarthObject], approaches: &mut [CloseApproach]) -> usize {
    let mut neo_order: Vec<usize> = (0..neos.len()).collect();
    neo_order.sort_by(|&a, &b| neos[a].designation.cmp(&neos[b].designation));

    let mut approach_order: Vec<usize> = (0..approaches.len()).collect();
    approach_order.sort_by(|&a, &b| approaches[a].designation.cmp(&approaches[b].designation));

    let mut i = 0;
    let mut j = 0;
    let mut linked = 0;

    while i < neo_order.len() && j < approach_order.len() {
        let neo_idx = neo_order[i];
        let approach_idx = approach_order[j];

        match neos[neo_idx]
            .designation
            .cmp(&approaches[approach_idx].designation)
        {
            std::cmp::Ordering::Equal => {
                neos[neo_idx].approaches.push(ApproachId(approach_idx));
                approaches[approach_idx].neo = Some(NeoId(neo_idx));
                linked += 1;
                // A NEO may own many approaches: only the approach cursor moves
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            // Orphan approach sorting between two NEOs
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    linked
}

// ============================================================================
// DATABASE
// ============================================================================

/// In-memory database of NEOs and their close approaches
#[derive(Debug)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    index: NeoIndex,
}

impl NeoDatabase {
    /// Link the collections and build the lookup index
    ///
    /// # Errors
    /// Fails if any input entity is already linked. The linker does not
    /// merge into a partially linked graph.
    pub fn new(neos: Vec<NearEarthObject>, approaches: Vec<CloseApproach>) -> Result<Self> {
        let mut neos = neos;
        let mut approaches = approaches;

        if let Some(neo) = neos.iter().find(|n| n.is_linked()) {
            bail!("NEO {:?} is already linked to close approaches", neo.designation);
        }
        ensure!(
            approaches.iter().all(|a| a.neo.is_none()),
            "Close approaches must be unlinked before building a database"
        );

        let linked = link(&mut neos, &mut approaches);
        info!(
            neos = neos.len(),
            approaches = approaches.len(),
            linked,
            unlinked = approaches.len() - linked,
            "linked close approaches"
        );

        let index = NeoIndex::build(&neos);
        debug!(entries = index.len(), "built NEO lookup index");

        Ok(NeoDatabase {
            neos,
            approaches,
            index,
        })
    }

    /// All NEOs, in supplied order
    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    /// All close approaches, in supplied order
    pub fn approaches(&self) -> &[CloseApproach] {
        &self.approaches
    }

    pub fn neo(&self, id: NeoId) -> Option<&NearEarthObject> {
        self.neos.get(id.0)
    }

    pub fn approach(&self, id: ApproachId) -> Option<&CloseApproach> {
        self.approaches.get(id.0)
    }

    /// Pair an approach with its owning NEO
    fn resolve<'a>(&'a self, approach: &'a CloseApproach) -> LinkedApproach<'a> {
        let neo = approach.neo.and_then(|id| self.neo(id));
        LinkedApproach::new(approach, neo)
    }

    /// Close approaches of a NEO
    ///
    /// Works for live NEOs and for snapshots returned by the lookups, since
    /// both carry the same approach ids.
    pub fn approaches_of<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = LinkedApproach<'a>> + 'a {
        neo.approaches
            .iter()
            .filter_map(move |&id| self.approach(id))
            .map(move |approach| self.resolve(approach))
    }

    /// Find a NEO by primary designation
    ///
    /// Tries the key as given, lower-cased and upper-cased. Returns an owned
    /// snapshot taken at construction time, or `None`.
    pub fn lookup_by_designation(&self, designation: &str) -> Option<NearEarthObject> {
        self.index.lookup_by_designation(designation)
    }

    /// Find a NEO by name
    ///
    /// Same key policy as `lookup_by_designation`. Unnamed NEOs never match.
    pub fn lookup_by_name(&self, name: &str) -> Option<NearEarthObject> {
        self.index.lookup_by_name(name)
    }

    pub fn get_neo_by_designation(&self, designation: &str) -> Option<NearEarthObject> {
        self.lookup_by_designation(designation)
    }

    pub fn get_neo_by_name(&self, name: &str) -> Option<NearEarthObject> {
        self.lookup_by_name(name)
    }

    /// Lazily yield the close approaches matching every filter
    ///
    /// Approaches come out in supplied order. Filters run left to right and
    /// stop at the first one that fails. With no filters every approach is
    /// yielded, unlinked ones included.
    pub fn query<'a, F>(&'a self, filters: &'a [F]) -> impl Iterator<Item = LinkedApproach<'a>> + 'a
    where
        F: ApproachFilter,
    {
        self.approaches
            .iter()
            .map(move |approach| self.resolve(approach))
            .filter(move |linked| filters.iter().all(|filter| filter.matches(linked)))
    }

    /// Every close approach, unfiltered
    pub fn all_approaches(&self) -> impl Iterator<Item = LinkedApproach<'_>> + '_ {
        self.approaches.iter().map(move |approach| self.resolve(approach))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{AttributeFilter, Comparison, Predicate};
    use crate::helpers::cd_to_datetime;
    use std::cell::Cell;

    fn neo(designation: &str, name: Option<&str>) -> NearEarthObject {
        NearEarthObject::new(
            designation.to_string(),
            name.map(|n| n.to_string()),
            f64::NAN,
            false,
        )
    }

    fn approach(designation: &str, distance: f64, velocity: f64) -> CloseApproach {
        let time = cd_to_datetime("2020-Jan-01 00:00").unwrap();
        CloseApproach::new(designation.to_string(), time, distance, velocity)
    }

    fn no_filters() -> &'static [AttributeFilter] {
        &[]
    }

    #[test]
    fn test_alpha_scenario() {
        let neos = vec![neo("1", Some("Alpha"))];
        let approaches = vec![approach("1", 0.5, 10.0), approach("9", 1.0, 5.0)];
        let db = NeoDatabase::new(neos, approaches).unwrap();

        // "1" owns exactly one approach, "9" is unlinked
        assert_eq!(db.neos()[0].approach_ids(), &[ApproachId(0)]);
        assert_eq!(db.approaches()[0].neo_id(), Some(NeoId(0)));
        assert_eq!(db.approaches()[1].neo_id(), None);

        // Unfiltered query yields both, in input order
        let all: Vec<_> = db.query(no_filters()).map(|a| a.designation.clone()).collect();
        assert_eq!(all, vec!["1", "9"]);

        assert_eq!(db.lookup_by_designation("1").unwrap().name.as_deref(), Some("Alpha"));
        assert_eq!(db.lookup_by_name("Alpha").unwrap().designation, "1");
        // Candidates of "ALPHA" are ALPHA / alpha / ALPHA: no match for "Alpha"
        assert!(db.lookup_by_name("ALPHA").is_none());
        assert!(db.lookup_by_name("alpha").is_none());
    }

    #[test]
    fn test_disjoint_keys_link_nothing() {
        let neos = vec![neo("a", None), neo("b", None)];
        let approaches = vec![approach("x", 0.1, 1.0), approach("y", 0.2, 2.0)];
        let db = NeoDatabase::new(neos, approaches).unwrap();

        assert!(db.neos().iter().all(|n| n.approach_ids().is_empty()));
        assert!(db.approaches().iter().all(|a| a.neo_id().is_none()));
    }

    #[test]
    fn test_every_matching_approach_is_linked_once() {
        // Orphans sort before, between and after the NEOs
        let neos = vec![neo("3", None), neo("1", None), neo("5", None)];
        let approaches = vec![
            approach("5", 0.1, 1.0),
            approach("0", 0.1, 1.0),
            approach("1", 0.2, 1.0),
            approach("2", 0.1, 1.0),
            approach("3", 0.3, 1.0),
            approach("1", 0.4, 1.0),
            approach("9", 0.1, 1.0),
        ];
        let db = NeoDatabase::new(neos, approaches).unwrap();

        for (neo_idx, neo) in db.neos().iter().enumerate() {
            let expected: Vec<ApproachId> = db
                .approaches()
                .iter()
                .enumerate()
                .filter(|(_, a)| a.designation == neo.designation)
                .map(|(i, _)| ApproachId(i))
                .collect();
            assert_eq!(neo.approach_ids(), expected.as_slice());

            for id in neo.approach_ids() {
                assert_eq!(db.approach(*id).unwrap().neo_id(), Some(NeoId(neo_idx)));
            }
        }

        let unlinked: Vec<_> = db
            .approaches()
            .iter()
            .filter(|a| a.neo_id().is_none())
            .map(|a| a.designation.as_str())
            .collect();
        assert_eq!(unlinked, vec!["0", "2", "9"]);
    }

    #[test]
    fn test_storage_order_is_preserved() {
        let neos = vec![neo("b", None), neo("a", None)];
        let approaches = vec![approach("b", 0.1, 1.0), approach("a", 0.2, 1.0), approach("b", 0.3, 1.0)];
        let db = NeoDatabase::new(neos, approaches).unwrap();

        assert_eq!(db.neos()[0].designation, "b");
        let distances: Vec<f64> = db.all_approaches().map(|a| a.distance).collect();
        assert_eq!(distances, vec![0.1, 0.2, 0.3]);

        // Approaches of "b" are in supplied order
        let b = db.lookup_by_designation("b").unwrap();
        let b_distances: Vec<f64> = db.approaches_of(&b).map(|a| a.distance).collect();
        assert_eq!(b_distances, vec![0.1, 0.3]);
    }

    #[test]
    fn test_already_linked_input_is_rejected() {
        let db = NeoDatabase::new(vec![neo("1", None)], vec![approach("1", 0.1, 1.0)]).unwrap();
        let snapshot = db.lookup_by_designation("1").unwrap();

        let result = NeoDatabase::new(vec![snapshot], vec![approach("1", 0.1, 1.0)]);
        assert!(result.is_err());

        let linked_approach = db.approaches()[0].clone();
        let result = NeoDatabase::new(vec![neo("1", None)], vec![linked_approach]);
        assert!(result.is_err());
    }

    #[test]
    fn test_get_neo_aliases_match_lookups() {
        let db = NeoDatabase::new(vec![neo("433", Some("Eros")), neo("1", None)], vec![]).unwrap();

        assert_eq!(db.get_neo_by_designation("433"), db.lookup_by_designation("433"));
        assert_eq!(db.get_neo_by_name("Eros").unwrap().designation, "433");
        assert!(db.get_neo_by_designation("2").is_none());
        assert!(db.get_neo_by_name("1").is_none());
    }

    #[test]
    fn test_lookup_returns_independent_snapshot() {
        let db = NeoDatabase::new(vec![neo("1", Some("Alpha"))], vec![approach("1", 0.1, 1.0)]).unwrap();

        let mut snapshot = db.lookup_by_designation("1").unwrap();
        snapshot.name = Some("Changed".to_string());
        snapshot.hazardous = true;

        assert_eq!(db.neos()[0].name.as_deref(), Some("Alpha"));
        assert_eq!(db.lookup_by_designation("1").unwrap().name.as_deref(), Some("Alpha"));
        let linked = db.all_approaches().next().unwrap();
        assert_eq!(linked.neo().unwrap().name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_query_always_false_is_empty() {
        let db = NeoDatabase::new(vec![neo("1", None)], vec![approach("1", 0.1, 1.0)]).unwrap();
        let never = [Predicate(|_: &LinkedApproach<'_>| false)];
        assert_eq!(db.query(&never).count(), 0);
    }

    #[test]
    fn test_query_conjunction_ignores_filter_order() {
        let neos = vec![neo("1", None)];
        let approaches = vec![
            approach("1", 0.1, 10.0),
            approach("1", 0.5, 10.0),
            approach("1", 0.1, 30.0),
            approach("2", 0.1, 10.0),
        ];
        let db = NeoDatabase::new(neos, approaches).unwrap();

        let near = AttributeFilter::Distance(Comparison::Le, 0.2);
        let slow = AttributeFilter::Velocity(Comparison::Le, 20.0);

        let forward: Vec<f64> = db.query(&[near, slow]).map(|a| a.velocity + a.distance).collect();
        let backward: Vec<f64> = db.query(&[slow, near]).map(|a| a.velocity + a.distance).collect();

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
        // Includes the unlinked approach: no filter here needs the NEO
        assert!(db.query(&[near, slow]).any(|a| a.neo().is_none()));
    }

    #[test]
    fn test_query_short_circuits() {
        let db = NeoDatabase::new(
            vec![neo("1", None)],
            vec![approach("1", 0.1, 1.0), approach("1", 0.9, 1.0)],
        )
        .unwrap();

        let second_calls = Cell::new(0);
        let filters: Vec<Box<dyn ApproachFilter + '_>> = vec![
            Box::new(Predicate(|a: &LinkedApproach<'_>| a.distance < 0.5)),
            Box::new(Predicate(|_: &LinkedApproach<'_>| {
                second_calls.set(second_calls.get() + 1);
                true
            })),
        ];

        assert_eq!(db.query(&filters).count(), 1);
        // The second filter only saw the approach that passed the first
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn test_query_is_lazy() {
        let approaches = (0..100).map(|i| approach("1", i as f64, 1.0)).collect();
        let db = NeoDatabase::new(vec![neo("1", None)], approaches).unwrap();

        let calls = Cell::new(0);
        let counting = [Predicate(|_: &LinkedApproach<'_>| {
            calls.set(calls.get() + 1);
            true
        })];

        let first_three: Vec<_> = db.query(&counting).take(3).collect();
        assert_eq!(first_three.len(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_owner_filter_on_unlinked_approach_does_not_match() {
        let db = NeoDatabase::new(
            vec![NearEarthObject::new("1".to_string(), None, 1.0, true)],
            vec![approach("1", 0.1, 1.0), approach("2", 0.1, 1.0)],
        )
        .unwrap();

        let hazardous = [AttributeFilter::Hazardous(true)];
        let not_hazardous = [AttributeFilter::Hazardous(false)];

        assert_eq!(db.query(&hazardous).count(), 1);
        assert_eq!(db.query(&not_hazardous).count(), 0);
    }
}
