//! List and saved-view references
//!
//! A `ListReference` is an opaque handle over a list id and an optional
//! saved-view id. It resolves to the concrete paginated endpoint path and
//! to the destination table name, both deterministically: the same pair
//! always yields the same path and table, and a plain list never collides
//! with a saved view on the same list.

use serde::{Deserialize, Serialize};

/// A reference to a list, or to a saved view of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListReference {
    /// The list id
    pub list_id: u64,
    /// The saved-view id, when referencing a view rather than the whole list
    #[serde(default)]
    pub view_id: Option<u64>,
}

impl ListReference {
    /// Reference a whole list
    pub fn new(list_id: u64) -> Self {
        Self {
            list_id,
            view_id: None,
        }
    }

    /// Reference a saved view of a list
    pub fn with_view(list_id: u64, view_id: u64) -> Self {
        Self {
            list_id,
            view_id: Some(view_id),
        }
    }

    /// The paginated list-entries endpoint path for this reference
    pub fn entries_path(&self) -> String {
        match self.view_id {
            Some(view_id) => format!(
                "lists/{}/saved-views/{}/list-entries",
                self.list_id, view_id
            ),
            None => format!("lists/{}/list-entries", self.list_id),
        }
    }

    /// The destination table name for entries of this reference
    ///
    /// Distinct lists and views land in disjoint tables.
    pub fn table_name(&self) -> String {
        format!("lists-{self}-entries")
    }
}

impl std::fmt::Display for ListReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.view_id {
            Some(view_id) => write!(f, "{}-{}", self.list_id, view_id),
            None => write!(f, "{}", self.list_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_list_path() {
        let list_ref = ListReference::new(248283);
        assert_eq!(list_ref.entries_path(), "lists/248283/list-entries");
    }

    #[test]
    fn test_saved_view_path() {
        let list_ref = ListReference::with_view(247888, 1869904);
        assert_eq!(
            list_ref.entries_path(),
            "lists/247888/saved-views/1869904/list-entries"
        );
    }

    #[test]
    fn test_table_names_are_disjoint() {
        let plain = ListReference::new(247888);
        let view = ListReference::with_view(247888, 1869904);

        assert_eq!(plain.table_name(), "lists-247888-entries");
        assert_eq!(view.table_name(), "lists-247888-1869904-entries");
        assert_ne!(plain.table_name(), view.table_name());
        assert_ne!(plain.entries_path(), view.entries_path());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = ListReference::with_view(69224, 351112);
        let b = ListReference::with_view(69224, 351112);
        assert_eq!(a, b);
        assert_eq!(a.entries_path(), b.entries_path());
        assert_eq!(a.table_name(), b.table_name());
    }

    #[test]
    fn test_serde_roundtrip() {
        let list_ref = ListReference::with_view(126638, 1133940);
        let json = serde_json::to_string(&list_ref).unwrap();
        let back: ListReference = serde_json::from_str(&json).unwrap();
        assert_eq!(list_ref, back);

        let plain: ListReference = serde_json::from_str("{\"list_id\": 157541}").unwrap();
        assert_eq!(plain, ListReference::new(157541));
    }
}
