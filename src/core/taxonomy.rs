/*
 * This module holds the theme taxonomy: a forest of named themes where every
 * name is unique across the whole forest. It provides the pure expansion of a
 * selection into the flat set of theme names a query matches against, and a
 * loader for the taxonomy document (theme forest plus granularity scales).
 *
 * The taxonomy is immutable once constructed and is passed explicitly to the
 * components that need it; there is no process-wide theme dictionary.
 */
use super::granularity::{GranularityScale, GranularityScales};
use super::selection::SelectionState;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

#[derive(Debug)]
pub enum TaxonomyError {
    Io(io::Error),
    Serde(serde_json::Error),
    DuplicateTheme(String),
    InvalidThemeNode(String),
}

impl From<io::Error> for TaxonomyError {
    fn from(err: io::Error) -> Self {
        TaxonomyError::Io(err)
    }
}

impl From<serde_json::Error> for TaxonomyError {
    fn from(err: serde_json::Error) -> Self {
        TaxonomyError::Serde(err)
    }
}

impl std::fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxonomyError::Io(e) => write!(f, "Taxonomy I/O error: {e}"),
            TaxonomyError::Serde(e) => write!(f, "Taxonomy document parse error: {e}"),
            TaxonomyError::DuplicateTheme(name) => {
                write!(f, "Theme '{name}' appears more than once in the taxonomy")
            }
            TaxonomyError::InvalidThemeNode(name) => write!(
                f,
                "Theme '{name}' must map to an object of sub-themes (or be empty)"
            ),
        }
    }
}

impl std::error::Error for TaxonomyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaxonomyError::Io(e) => Some(e),
            TaxonomyError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxonomyError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeNode {
    pub name: String,
    pub children: Vec<ThemeNode>,
}

impl ThemeNode {
    pub fn new(name: impl Into<String>) -> Self {
        ThemeNode {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<ThemeNode>) -> Self {
        ThemeNode {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Names of every node strictly below this one, depth-first.
    pub fn descendant_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for child in &self.children {
            child.collect_subtree_names(&mut names);
        }
        names
    }

    fn collect_subtree_names(&self, out: &mut Vec<String>) {
        out.push(self.name.clone());
        for child in &self.children {
            child.collect_subtree_names(out);
        }
    }

    fn find(&self, name: &str) -> Option<&ThemeNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /*
     * Builds a node from one entry of the nested theme object. `null` and `{}`
     * both mean "no sub-themes"; any other non-object value is rejected.
     */
    fn from_json_entry(name: &str, value: &Value) -> Result<ThemeNode> {
        let children = match value {
            Value::Null => Vec::new(),
            Value::Object(map) => Self::forest_from_json(map)?,
            _ => return Err(TaxonomyError::InvalidThemeNode(name.to_string())),
        };
        Ok(ThemeNode::with_children(name, children))
    }

    fn forest_from_json(map: &Map<String, Value>) -> Result<Vec<ThemeNode>> {
        map.iter()
            .map(|(name, value)| Self::from_json_entry(name, value))
            .collect()
    }
}

/*
 * The validated theme forest. Construction fails if a name occurs twice, since
 * names are the keys of `SelectionState` and of dataset theme matching.
 */
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Taxonomy {
    roots: Vec<ThemeNode>,
}

impl Taxonomy {
    pub fn new(roots: Vec<ThemeNode>) -> Result<Self> {
        let mut seen = HashSet::new();
        for root in &roots {
            let mut names = vec![root.name.clone()];
            names.extend(root.descendant_names());
            for name in names {
                if !seen.insert(name.clone()) {
                    return Err(TaxonomyError::DuplicateTheme(name));
                }
            }
        }
        Ok(Taxonomy { roots })
    }

    pub fn roots(&self) -> &[ThemeNode] {
        &self.roots
    }

    pub fn find(&self, name: &str) -> Option<&ThemeNode> {
        self.roots.iter().find_map(|root| root.find(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn all_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for root in &self.roots {
            root.collect_subtree_names(&mut names);
        }
        names
    }

    pub fn expand(&self, selection: &SelectionState) -> HashSet<String> {
        expand(selection, &self.roots)
    }
}

/*
 * Expands a selection into the flat set of theme names to match.
 * A checked node contributes itself and its whole subtree, whatever flags the
 * descendants carry. Unchecked nodes are still walked, so a theme checked on
 * its own below an unchecked parent is not lost.
 */
pub fn expand(selection: &SelectionState, roots: &[ThemeNode]) -> HashSet<String> {
    let mut selected = HashSet::new();
    for node in roots {
        if selection.is_checked(&node.name) {
            selected.insert(node.name.clone());
            selected.extend(node.descendant_names());
        } else {
            selected.extend(expand(selection, &node.children));
        }
    }
    selected
}

#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    themes: Map<String, Value>,
    #[serde(default)]
    spatial_granularity: GranularityScale,
    #[serde(default)]
    temporal_granularity: GranularityScale,
}

/// Everything the taxonomy document provides.
#[derive(Debug, Clone)]
pub struct LoadedTaxonomy {
    pub taxonomy: Taxonomy,
    pub scales: GranularityScales,
}

pub trait TaxonomyLoaderOperations: Send + Sync {
    fn load_taxonomy(&self, path: &Path) -> Result<LoadedTaxonomy>;
}

pub struct CoreTaxonomyLoader {}

impl CoreTaxonomyLoader {
    pub fn new() -> Self {
        CoreTaxonomyLoader {}
    }

    pub fn parse_document(reader: impl io::Read) -> Result<LoadedTaxonomy> {
        let document: TaxonomyDocument = serde_json::from_reader(reader)?;
        let roots = ThemeNode::forest_from_json(&document.themes)?;
        Ok(LoadedTaxonomy {
            taxonomy: Taxonomy::new(roots)?,
            scales: GranularityScales {
                spatial: document.spatial_granularity,
                temporal: document.temporal_granularity,
            },
        })
    }
}

impl Default for CoreTaxonomyLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonomyLoaderOperations for CoreTaxonomyLoader {
    fn load_taxonomy(&self, path: &Path) -> Result<LoadedTaxonomy> {
        log::trace!("CoreTaxonomyLoader: Loading taxonomy document from {path:?}");
        let file = File::open(path)?;
        let loaded = Self::parse_document(BufReader::new(file))?;
        log::debug!(
            "CoreTaxonomyLoader: Loaded {} root themes ({} in total) from {path:?}.",
            loaded.taxonomy.roots().len(),
            loaded.taxonomy.all_names().len()
        );
        Ok(loaded)
    }
}

#[cfg(test)]
pub(crate) fn sample_taxonomy() -> Taxonomy {
    Taxonomy::new(vec![
        ThemeNode::with_children(
            "Environment",
            vec![
                ThemeNode::new("Air Quality"),
                ThemeNode::with_children(
                    "Water",
                    vec![ThemeNode::new("Rivers"), ThemeNode::new("Groundwater")],
                ),
            ],
        ),
        ThemeNode::with_children("Society", vec![ThemeNode::new("Population")]),
    ])
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_checked_parent_includes_all_descendants() {
        // Arrange
        let taxonomy = sample_taxonomy();
        let mut selection = SelectionState::new();
        selection.set_checked("Environment", true);
        // A stale child flag must not matter once the ancestor is checked.
        selection.set_checked("Rivers", false);

        // Act
        let expanded = taxonomy.expand(&selection);

        // Assert
        assert_eq!(
            expanded,
            names(&["Environment", "Air Quality", "Water", "Rivers", "Groundwater"])
        );
    }

    #[test]
    fn test_expand_checked_node_below_unchecked_parent() {
        let taxonomy = sample_taxonomy();
        let mut selection = SelectionState::new();
        selection.set_checked("Water", true);
        selection.set_checked("Population", true);

        let expanded = taxonomy.expand(&selection);

        assert_eq!(
            expanded,
            names(&["Water", "Rivers", "Groundwater", "Population"])
        );
    }

    #[test]
    fn test_expand_empty_selection_is_empty() {
        let taxonomy = sample_taxonomy();
        assert!(taxonomy.expand(&SelectionState::new()).is_empty());
    }

    #[test]
    fn test_expand_is_monotonic() {
        let taxonomy = sample_taxonomy();
        let mut smaller = SelectionState::new();
        smaller.set_checked("Rivers", true);
        let mut larger = smaller.clone();
        larger.set_checked("Environment", true);

        let small_set = taxonomy.expand(&smaller);
        let large_set = taxonomy.expand(&larger);

        assert!(small_set.is_subset(&large_set));
        assert!(large_set.contains("Environment"));
    }

    #[test]
    fn test_duplicate_theme_rejected() {
        let result = Taxonomy::new(vec![
            ThemeNode::with_children("A", vec![ThemeNode::new("Shared")]),
            ThemeNode::with_children("B", vec![ThemeNode::new("Shared")]),
        ]);
        match result {
            Err(TaxonomyError::DuplicateTheme(name)) => assert_eq!(name, "Shared"),
            other => panic!("Expected DuplicateTheme, got {other:?}"),
        }
    }

    #[test]
    fn test_find_and_all_names() {
        let taxonomy = sample_taxonomy();
        assert_eq!(
            taxonomy.find("Water").map(|n| n.children.len()),
            Some(2)
        );
        assert!(taxonomy.find("Rivers").is_some_and(|n| n.is_leaf()));
        assert!(!taxonomy.contains("Climate"));
        assert_eq!(
            taxonomy.all_names(),
            vec![
                "Environment",
                "Air Quality",
                "Water",
                "Rivers",
                "Groundwater",
                "Society",
                "Population"
            ]
        );
    }

    #[test]
    fn test_load_taxonomy_document_preserves_order() {
        // Arrange
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "themes": {{
                    "Mobility": {{ "Roads": {{}}, "Cycling": null }},
                    "Energy": {{}}
                }},
                "spatial_granularity": [[[1, "Commune"], [3, "Region"]]],
                "temporal_granularity": [[[1, "Day"], [3, "Year"]]]
            }}"#
        )
        .unwrap();

        // Act
        let loaded = CoreTaxonomyLoader::new()
            .load_taxonomy(file.path())
            .unwrap();

        // Assert
        assert_eq!(
            loaded.taxonomy.all_names(),
            vec!["Mobility", "Roads", "Cycling", "Energy"]
        );
        assert_eq!(loaded.scales.spatial.option_names(), vec!["Commune", "Region"]);
        assert_eq!(loaded.scales.temporal.option_names(), vec!["Day", "Year"]);
    }

    #[test]
    fn test_load_taxonomy_without_scales_uses_empty_scales() {
        let loaded =
            CoreTaxonomyLoader::parse_document(r#"{"themes": {"Health": {}}}"#.as_bytes())
                .unwrap();
        assert!(loaded.scales.spatial.is_empty());
        assert!(loaded.scales.temporal.is_empty());
    }

    #[test]
    fn test_load_taxonomy_rejects_non_object_theme() {
        let result = CoreTaxonomyLoader::parse_document(r#"{"themes": {"Health": 3}}"#.as_bytes());
        assert!(matches!(result, Err(TaxonomyError::InvalidThemeNode(name)) if name == "Health"));
    }

    #[test]
    fn test_load_taxonomy_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CoreTaxonomyLoader::new().load_taxonomy(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(TaxonomyError::Io(_))));
    }
}
