//! Picks one representative record per workflow name.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Deserialize;

use crate::status::NormalizedRecord;

/// How a representative is chosen among records sharing a workflow name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// First record in API order. Oozie lists the newest job first, so this
    /// is the most recent run as long as that ordering holds.
    #[default]
    FirstSeen,
    /// Record with the latest `last_status_time`; ties go to API order.
    Latest,
}

/// Groups records by workflow name and keeps one per group.
///
/// Keys come back sorted by name, matching a stable sort followed by
/// run-length grouping.
pub fn select(
    records: Vec<NormalizedRecord>,
    policy: SelectionPolicy,
) -> BTreeMap<String, NormalizedRecord> {
    let mut selected: BTreeMap<String, NormalizedRecord> = BTreeMap::new();

    for record in records {
        match selected.entry(record.workflow_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if policy == SelectionPolicy::Latest
                    && record.last_status_time > slot.get().last_status_time
                {
                    slot.insert(record);
                }
            }
        }
    }

    selected
}
