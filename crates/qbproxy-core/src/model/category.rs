//! Category and tag domain types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A save-path-scoped grouping a torrent can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category name, used as the lookup key.
    pub name: String,
    /// Default save path associated with the category.
    #[serde(default)]
    pub save_path: String,
}

/// A plain label a torrent can carry, independent of save path.
pub type Tag = String;

/// `name -> Category` mapping as reported by `MainData`.
pub type CategoryMap = BTreeMap<String, Category>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_map_is_keyed_by_name() {
        let mut map: CategoryMap = CategoryMap::new();
        map.insert(
            "movies".to_string(),
            Category {
                name: "movies".to_string(),
                save_path: "/data/movies".to_string(),
            },
        );
        assert_eq!(map.get("movies").unwrap().save_path, "/data/movies");
    }
}
