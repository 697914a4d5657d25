//! # Records
//!
//! A [`ResolvedRecord`] is everything one label shows: a name, the permalink
//! encoded in the QR code, and a storage location line.
//!
//! Records come in two shapes upstream. An *item* has at most one storage
//! location. A *group* aggregates items, and its location line lists the
//! distinct locations of its items in first-seen order.

use serde::{Deserialize, Serialize};

/// Prefix of every record permalink. The GUID is appended verbatim.
pub const PERMALINK_BASE: &str = "https://app.labstep.com/perma-link/";

/// Location line used when a record has no known location.
pub const NO_LOCATION: &str = "No location";

/// Separator between distinct locations of an aggregate record.
pub const LOCATION_SEPARATOR: &str = "; ";

/// Build the permalink for a record GUID.
pub fn permalink_url(guid: &str) -> String {
    format!("{}{}", PERMALINK_BASE, guid)
}

/// A single item as returned by a record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub guid: String,
    /// Storage location path, if the item has been placed somewhere
    pub location_path: Option<String>,
}

/// A group of items as returned by a record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,
    pub guid: String,
    /// Location path of each member item, in source order. Items without a
    /// location are absent.
    pub item_locations: Vec<String>,
}

/// The input to label composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// Human-readable title, any length
    pub display_name: String,
    /// QR payload, used verbatim
    pub permalink_url: String,
    /// Never empty; [`NO_LOCATION`] when nothing is known
    pub location_text: String,
}

impl ResolvedRecord {
    pub fn new(display_name: &str, permalink_url: &str, location_text: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            permalink_url: permalink_url.to_string(),
            location_text: location_text.to_string(),
        }
    }

    /// Build the label record for a single item.
    pub fn from_item(item: &ItemRecord) -> Self {
        let location = item
            .location_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .unwrap_or(NO_LOCATION);

        Self {
            display_name: item.name.clone(),
            permalink_url: permalink_url(&item.guid),
            location_text: location.to_string(),
        }
    }

    /// Build the label record for a group of items.
    pub fn from_group(group: &GroupRecord) -> Self {
        Self {
            display_name: group.name.clone(),
            permalink_url: permalink_url(&group.guid),
            location_text: join_locations(&group.item_locations),
        }
    }
}

/// Join distinct, non-empty location paths with `"; "`, keeping the order in
/// which each path first appears. Returns [`NO_LOCATION`] if none remain.
pub fn join_locations<S: AsRef<str>>(paths: &[S]) -> String {
    let mut distinct: Vec<&str> = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_empty() && !distinct.contains(&path) {
            distinct.push(path);
        }
    }

    if distinct.is_empty() {
        NO_LOCATION.to_string()
    } else {
        distinct.join(LOCATION_SEPARATOR)
    }
}
