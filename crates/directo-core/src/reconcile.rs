//! Reconciler: join roster children to the directory by composite key

use crate::normalize::{DirectoryData, RosterData};
use crate::record::{EnrichedChild, EnrichedMap, Merge};
use log::debug;

/// Enrich every roster child with directory attributes and resolved parents
///
/// The join is by exact key. A child missing from the directory keeps its
/// roster attributes and gets no parents; parent keys that do not resolve are
/// dropped. Neither case is an error.
pub fn enrich(roster: &RosterData, directory: &DirectoryData) -> EnrichedMap {
    roster
        .children
        .iter()
        .map(|(key, roster_child)| {
            let mut child = roster_child.clone();
            match directory.children.get(key) {
                Some(listed) => child.merge(listed.clone()),
                None => debug!("child '{}' not in directory data", key),
            }

            let parents = child
                .parent_keys
                .iter()
                .filter_map(|parent_key| {
                    let parent = directory.parents.get(parent_key);
                    if parent.is_none() {
                        debug!("parent '{}' of '{}' not in directory data", parent_key, key);
                    }
                    parent.cloned()
                })
                .collect();

            (key.clone(), EnrichedChild { child, parents })
        })
        .collect()
}
