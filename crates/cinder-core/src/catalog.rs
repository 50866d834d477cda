//! Quality Catalog - selectable quality options derived from the manifest
//!
//! The catalog always starts with the synthetic automatic entry, followed by
//! one entry per engine level in the order the engine reported them. A level's
//! id is its index in the engine's level list, which is also the value the
//! engine expects back when switching.

use crate::types::{LevelInfo, QualityOption, QualitySelector, AUTOMATIC_LEVEL};
use serde::{Deserialize, Serialize};

/// Ordered list of quality options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityCatalog {
    options: Vec<QualityOption>,
}

impl QualityCatalog {
    /// Catalog offering only automatic selection
    pub fn automatic_only() -> Self {
        Self {
            options: vec![QualityOption::automatic()],
        }
    }

    /// Build a catalog from the engine's level list
    pub fn from_levels(levels: &[LevelInfo]) -> Self {
        let options = std::iter::once(QualityOption::automatic())
            .chain(
                (0u32..)
                    .zip(levels)
                    .map(|(index, level)| QualityOption::from_level(index, level)),
            )
            .collect();

        Self { options }
    }

    /// Look up an option by id
    pub fn get(&self, id: i32) -> Option<&QualityOption> {
        self.options.iter().find(|opt| opt.id == id)
    }

    /// Whether `id` names an entry of this catalog
    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }

    /// Display label for a selector; unknown levels show as automatic
    pub fn label_for(&self, selector: QualitySelector) -> &str {
        match selector {
            QualitySelector::Automatic => QualityOption::AUTOMATIC_LABEL,
            QualitySelector::Level(_) => self
                .get(selector.engine_id())
                .map_or(QualityOption::AUTOMATIC_LABEL, |opt| opt.label.as_str()),
        }
    }

    /// Number of concrete (non-automatic) levels
    pub fn concrete_len(&self) -> usize {
        self.options.iter().filter(|opt| opt.id != AUTOMATIC_LEVEL).count()
    }

    /// Total number of entries, automatic included
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Never true; the automatic entry is always present
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QualityOption> {
        self.options.iter()
    }

    pub fn as_slice(&self) -> &[QualityOption] {
        &self.options
    }
}

impl Default for QualityCatalog {
    fn default() -> Self {
        Self::automatic_only()
    }
}

impl<'a> IntoIterator for &'a QualityCatalog {
    type Item = &'a QualityOption;
    type IntoIter = std::slice::Iter<'a, QualityOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> Vec<LevelInfo> {
        vec![
            LevelInfo::new(640, 360, 800_000),
            LevelInfo::new(1280, 720, 2_500_000),
            LevelInfo::new(1920, 1080, 5_000_000),
        ]
    }

    #[test]
    fn test_automatic_first() {
        let catalog = QualityCatalog::from_levels(&ladder());
        let ids: Vec<i32> = catalog.iter().map(|o| o.id).collect();
        let labels: Vec<&str> = catalog.iter().map(|o| o.label.as_str()).collect();

        assert_eq!(ids, vec![-1, 0, 1, 2]);
        assert_eq!(labels, vec!["Auto", "360p", "720p", "1080p"]);
        assert_eq!(catalog.concrete_len(), 3);
        assert!(catalog.get(-1).unwrap().width.is_none());
    }

    #[test]
    fn test_empty_levels() {
        let catalog = QualityCatalog::from_levels(&[]);
        assert_eq!(catalog, QualityCatalog::automatic_only());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.concrete_len(), 0);
    }

    #[test]
    fn test_label_lookup_by_id() {
        let catalog = QualityCatalog::from_levels(&ladder());
        assert_eq!(catalog.label_for(QualitySelector::Level(1)), "720p");
        assert_eq!(catalog.label_for(QualitySelector::Automatic), "Auto");
        // Out of range falls back instead of indexing past the end
        assert_eq!(catalog.label_for(QualitySelector::Level(3)), "Auto");
        assert_eq!(QualityCatalog::automatic_only().label_for(QualitySelector::Level(0)), "Auto");
    }
}
