//! # Record Resolution
//!
//! Maps an integer identifier to a [`ResolvedRecord`].
//!
//! An identifier may name a single item or a group of items. Lookup tries
//! the item first and falls back to the group; the first success wins. An
//! identifier that matches neither, or whose lookups fail, is unresolved.
//!
//! ## Modules
//!
//! - [`labstep`]: HTTP record source for the Labstep REST API

pub mod labstep;

use async_trait::async_trait;

use crate::error::LabelError;
use crate::record::{GroupRecord, ItemRecord, ResolvedRecord};

pub use labstep::LabstepClient;

/// Where records come from.
///
/// `Ok(None)` means "no such record"; `Err` means the lookup itself failed.
/// The resolver treats both as a miss for that lookup.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Look up a single item by identifier.
    async fn item(&self, id: u64) -> Result<Option<ItemRecord>, LabelError>;

    /// Look up a group by identifier, including its items' locations.
    async fn group(&self, id: u64) -> Result<Option<GroupRecord>, LabelError>;
}

/// Outcome of resolving one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedRecord),
    NotFound,
}

/// Item-then-group lookup over a [`RecordSource`].
pub struct Resolver<'a, S: RecordSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: RecordSource + ?Sized> Resolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve `id` as an item, if it is one.
    pub async fn try_item_lookup(&self, id: u64) -> Option<ResolvedRecord> {
        match self.source.item(id).await {
            Ok(Some(item)) => Some(ResolvedRecord::from_item(&item)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(id, error = %e, "Item lookup failed");
                None
            }
        }
    }

    /// Resolve `id` as a group, if it is one.
    pub async fn try_group_lookup(&self, id: u64) -> Option<ResolvedRecord> {
        match self.source.group(id).await {
            Ok(Some(group)) => Some(ResolvedRecord::from_group(&group)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(id, error = %e, "Group lookup failed");
                None
            }
        }
    }

    /// Resolve `id`, trying the item lookup before the group lookup.
    pub async fn resolve(&self, id: u64) -> Resolution {
        if let Some(record) = self.try_item_lookup(id).await {
            return Resolution::Found(record);
        }
        if let Some(record) = self.try_group_lookup(id).await {
            return Resolution::Found(record);
        }
        Resolution::NotFound
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory record source for tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeSource {
        pub items: HashMap<u64, ItemRecord>,
        pub groups: HashMap<u64, GroupRecord>,
        /// Identifiers whose lookups return a transport error
        pub broken: HashSet<u64>,
        /// Every lookup performed, as ("item" | "group", id)
        pub calls: Mutex<Vec<(&'static str, u64)>>,
    }

    impl FakeSource {
        pub fn with_item(mut self, id: u64, name: &str, guid: &str, location: Option<&str>) -> Self {
            self.items.insert(
                id,
                ItemRecord {
                    name: name.to_string(),
                    guid: guid.to_string(),
                    location_path: location.map(str::to_string),
                },
            );
            self
        }

        pub fn with_group(mut self, id: u64, name: &str, guid: &str, locations: &[&str]) -> Self {
            self.groups.insert(
                id,
                GroupRecord {
                    name: name.to_string(),
                    guid: guid.to_string(),
                    item_locations: locations.iter().map(|s| s.to_string()).collect(),
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<(&'static str, u64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordSource for FakeSource {
        async fn item(&self, id: u64) -> Result<Option<ItemRecord>, LabelError> {
            self.calls.lock().unwrap().push(("item", id));
            if self.broken.contains(&id) {
                return Err(LabelError::Resolve("connection reset".to_string()));
            }
            Ok(self.items.get(&id).cloned())
        }

        async fn group(&self, id: u64) -> Result<Option<GroupRecord>, LabelError> {
            self.calls.lock().unwrap().push(("group", id));
            if self.broken.contains(&id) {
                return Err(LabelError::Resolve("connection reset".to_string()));
            }
            Ok(self.groups.get(&id).cloned())
        }
    }
}
