/*
 * Granularity ranks and the named scales they come from. A rank is a plain
 * ordinal where a smaller value means a finer resolution; the filter treats a
 * requested rank as an upper bound on a dataset's minimum granularity.
 *
 * Scales hold one or more hierarchies of `(rank, name)` levels, e.g. a spatial
 * administrative hierarchy and a spatial grid hierarchy. They are only used to
 * present level names to the user and to translate a chosen name back into a rank.
 */
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GranularityRank(pub u32);

impl fmt::Display for GranularityRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which dimension a granularity value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranularityAxis {
    Spatial,
    Temporal,
}

impl fmt::Display for GranularityAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GranularityAxis::Spatial => write!(f, "spatial"),
            GranularityAxis::Temporal => write!(f, "temporal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranularityLevel {
    pub rank: GranularityRank,
    pub name: String,
}

// Deserialized from `[rank, "name"]` pairs so the document stays compact.
impl From<(u32, String)> for GranularityLevel {
    fn from((rank, name): (u32, String)) -> Self {
        GranularityLevel {
            rank: GranularityRank(rank),
            name,
        }
    }
}

/*
 * A set of granularity hierarchies for one axis. The same level name may appear
 * in several hierarchies (with possibly different ranks); lookups return the
 * first occurrence in hierarchy order, which is also the order in which names
 * are offered to the user.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Vec<(u32, String)>>")]
pub struct GranularityScale {
    hierarchies: Vec<Vec<GranularityLevel>>,
}

impl From<Vec<Vec<(u32, String)>>> for GranularityScale {
    fn from(raw: Vec<Vec<(u32, String)>>) -> Self {
        GranularityScale {
            hierarchies: raw
                .into_iter()
                .map(|levels| levels.into_iter().map(GranularityLevel::from).collect())
                .collect(),
        }
    }
}

impl GranularityScale {
    pub fn new(hierarchies: Vec<Vec<GranularityLevel>>) -> Self {
        GranularityScale { hierarchies }
    }

    pub fn is_empty(&self) -> bool {
        self.hierarchies.iter().all(|h| h.is_empty())
    }

    /// Level names flattened in hierarchy order, duplicates removed.
    pub fn option_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for level in self.hierarchies.iter().flatten() {
            if !names.contains(&level.name) {
                names.push(level.name.clone());
            }
        }
        names
    }

    pub fn rank_of(&self, name: &str) -> Option<GranularityRank> {
        self.hierarchies
            .iter()
            .flatten()
            .find(|level| level.name == name)
            .map(|level| level.rank)
    }
}

/*
 * The pair of scales shipped alongside the theme taxonomy.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GranularityScales {
    pub spatial: GranularityScale,
    pub temporal: GranularityScale,
}

impl GranularityScales {
    pub fn for_axis(&self, axis: GranularityAxis) -> &GranularityScale {
        match axis {
            GranularityAxis::Spatial => &self.spatial,
            GranularityAxis::Temporal => &self.temporal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_and_grid() -> GranularityScale {
        GranularityScale::from(vec![
            vec![
                (1, "Commune".to_string()),
                (2, "Department".to_string()),
                (3, "Region".to_string()),
            ],
            vec![(1, "Grid 1km".to_string()), (3, "Region".to_string())],
        ])
    }

    #[test]
    fn test_option_names_flatten_in_order_without_duplicates() {
        let scale = admin_and_grid();
        assert_eq!(
            scale.option_names(),
            vec!["Commune", "Department", "Region", "Grid 1km"]
        );
    }

    #[test]
    fn test_rank_of_known_and_unknown_names() {
        let scale = admin_and_grid();
        assert_eq!(scale.rank_of("Department"), Some(GranularityRank(2)));
        assert_eq!(scale.rank_of("Grid 1km"), Some(GranularityRank(1)));
        assert_eq!(scale.rank_of("department"), None);
    }

    #[test]
    fn test_scale_deserializes_from_rank_name_pairs() {
        let json = r#"[[[1, "Hour"], [2, "Day"]], [[4, "Year"]]]"#;
        let scale: GranularityScale = serde_json::from_str(json).unwrap();
        assert_eq!(scale.rank_of("Year"), Some(GranularityRank(4)));
        assert!(!scale.is_empty());
        assert!(GranularityScale::default().is_empty());
    }

    #[test]
    fn test_rank_ordering_is_finer_first() {
        assert!(GranularityRank(1) < GranularityRank(2));
        assert_eq!(GranularityRank(7).to_string(), "7");
    }
}
