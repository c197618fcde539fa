/*
 * This module defines the dataset-metadata records and the loader that reads the
 * catalog (a JSON array of records) into memory. Only the fields the filter needs
 * are typed; everything else in a record is kept as raw JSON and never inspected.
 *
 * Typed fields are read leniently. A field that is missing, `null` or of an
 * unusable shape is logged and left empty, so it only fails whichever
 * constraint looks at it. Only unreadable JSON, a top level that is not an
 * array, or an array element that is not an object is a `CatalogError`, which
 * is distinct from a successfully loaded empty catalog.
 */
use super::granularity::{GranularityAxis, GranularityRank, GranularityScales};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Fixed-width layout of `min_date` / `max_date` in the catalog.
pub const CATALOG_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const SPATIAL_GRANULARITY_KEY: &str = "spatioGranularityMin";
const TEMPORAL_GRANULARITY_KEY: &str = "temporalGranularityMin";

#[derive(Debug)]
pub enum CatalogError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serde(err)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "Catalog I/O error: {e}"),
            CatalogError::Serde(e) => write!(f, "Catalog JSON error: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

pub fn parse_catalog_datetime(
    text: &str,
) -> std::result::Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(text, CATALOG_DATETIME_FORMAT)
}

fn deserialize_catalog_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<PrimitiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_catalog_datetime(&text)
        .map_err(|e| serde::de::Error::custom(format!("invalid catalog date-time '{text}': {e}")))
}

fn lenient_string(value: Value, field: &str) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => {
            log::warn!("CoreCatalogLoader: Ignoring non-string {field} value {other}");
            None
        }
    }
}

fn deserialize_theme_dataset<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(Value::deserialize(deserializer)?, "themeDataset"))
}

fn deserialize_scope_level<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(Value::deserialize(deserializer)?, "spatioScope Level"))
}

/*
 * A rank is a non-negative integer, or a string holding one. Level names are
 * turned into ranks before this point (see `resolve_level_names`); a name the
 * scale does not know arrives here as a string and is dropped.
 */
fn rank_from_json(value: &Value) -> Option<GranularityRank> {
    let rank = match value {
        Value::Null => return None,
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    };
    if rank.is_none() {
        log::warn!("CoreCatalogLoader: Ignoring unusable granularity value {value}");
    }
    rank.map(GranularityRank)
}

fn deserialize_granularity<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<GranularityRank>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(rank_from_json(&Value::deserialize(deserializer)?))
}

// `null` reads as an empty list. Entries that are not objects are dropped.
fn lenient_object_list<T: DeserializeOwned>(value: Value, field: &str) -> Vec<T> {
    let items = match value {
        Value::Null => return Vec::new(),
        Value::Array(items) => items,
        other => {
            log::warn!("CoreCatalogLoader: Ignoring {field} that is not a list: {other}");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| {
            if !item.is_object() {
                log::warn!("CoreCatalogLoader: Ignoring non-object {field} entry {item}");
                return None;
            }
            serde_json::from_value(item)
                .inspect_err(|e| {
                    log::warn!("CoreCatalogLoader: Ignoring unusable {field} entry: {e}")
                })
                .ok()
        })
        .collect()
}

fn deserialize_measures<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_object_list(Value::deserialize(deserializer)?, "measures"))
}

fn deserialize_complementary_info<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_object_list(Value::deserialize(deserializer)?, "complementaryInfo"))
}

fn deserialize_spatio_scope<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<SpatialScopeEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_object_list(Value::deserialize(deserializer)?, "spatioScope"))
}

fn deserialize_temporal_scope<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<TemporalScope>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => Ok(serde_json::from_value(value)
            .inspect_err(|e| log::warn!("CoreCatalogLoader: Ignoring unusable temporalScope: {e}"))
            .ok()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemporalScope {
    #[serde(deserialize_with = "deserialize_catalog_datetime")]
    pub min_date: PrimitiveDateTime,
    #[serde(deserialize_with = "deserialize_catalog_datetime")]
    pub max_date: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpatialScopeEntry {
    #[serde(rename = "Level", default, deserialize_with = "deserialize_scope_level")]
    pub level: Option<String>,
    #[serde(flatten)]
    pub other_fields: Map<String, Value>,
}

/*
 * One dataset description. `measures` and `complementaryInfo` are lists of
 * free-form objects; any of their top-level string values may name a theme.
 */
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRecord {
    #[serde(default, deserialize_with = "deserialize_theme_dataset")]
    pub theme_dataset: Option<String>,
    #[serde(default, deserialize_with = "deserialize_measures")]
    pub measures: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "deserialize_complementary_info")]
    pub complementary_info: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "deserialize_granularity")]
    pub spatio_granularity_min: Option<GranularityRank>,
    #[serde(default, deserialize_with = "deserialize_granularity")]
    pub temporal_granularity_min: Option<GranularityRank>,
    #[serde(default, deserialize_with = "deserialize_spatio_scope")]
    pub spatio_scope: Vec<SpatialScopeEntry>,
    #[serde(default, deserialize_with = "deserialize_temporal_scope")]
    pub temporal_scope: Option<TemporalScope>,
    #[serde(flatten)]
    pub other_fields: Map<String, Value>,
}

impl DatasetRecord {
    #[cfg(test)]
    pub fn with_theme(theme: &str) -> Self {
        DatasetRecord {
            theme_dataset: Some(theme.to_string()),
            measures: Vec::new(),
            complementary_info: Vec::new(),
            spatio_granularity_min: None,
            temporal_granularity_min: None,
            spatio_scope: Vec::new(),
            temporal_scope: None,
            other_fields: Map::new(),
        }
    }
}

/*
 * Replaces granularity level names in a raw record with their rank in the
 * matching scale, e.g. `"spatioGranularityMin": "Commune"` becomes `1`.
 * Values the scale does not know are left for the record reader to reject.
 */
fn resolve_level_names(record: &mut Value, scales: &GranularityScales) {
    let Value::Object(fields) = record else {
        return;
    };
    for (key, axis) in [
        (SPATIAL_GRANULARITY_KEY, GranularityAxis::Spatial),
        (TEMPORAL_GRANULARITY_KEY, GranularityAxis::Temporal),
    ] {
        let rank = match fields.get(key) {
            Some(Value::String(name)) => scales.for_axis(axis).rank_of(name.trim()),
            _ => None,
        };
        if let Some(rank) = rank {
            fields.insert(key.to_string(), Value::from(rank.0));
        }
    }
}

/// The loaded catalog, in file order. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<DatasetRecord>,
}

impl Catalog {
    pub fn from_records(records: Vec<DatasetRecord>) -> Self {
        Catalog { records }
    }

    /*
     * Builds a catalog from the parsed JSON document. Granularity level names
     * are looked up in `scales`.
     */
    pub fn from_json(document: Value, scales: &GranularityScales) -> Result<Self> {
        let raw_records: Vec<Value> = serde_json::from_value(document)?;
        let records = raw_records
            .into_iter()
            .map(|mut raw| {
                resolve_level_names(&mut raw, scales);
                serde_json::from_value(raw)
            })
            .collect::<serde_json::Result<Vec<DatasetRecord>>>()?;
        Ok(Catalog { records })
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub trait CatalogLoaderOperations: Send + Sync {
    fn load_catalog(&self, path: &Path, scales: &GranularityScales) -> Result<Catalog>;
}

pub struct CoreCatalogLoader {}

impl CoreCatalogLoader {
    pub fn new() -> Self {
        CoreCatalogLoader {}
    }
}

impl Default for CoreCatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogLoaderOperations for CoreCatalogLoader {
    fn load_catalog(&self, path: &Path, scales: &GranularityScales) -> Result<Catalog> {
        log::trace!("CoreCatalogLoader: Loading catalog from {path:?}");
        let file = File::open(path).map_err(|e| {
            log::error!("CoreCatalogLoader: Cannot open catalog {path:?}: {e}");
            e
        })?;
        let document: Value = serde_json::from_reader(BufReader::new(file))?;
        let catalog = Catalog::from_json(document, scales)?;
        log::debug!(
            "CoreCatalogLoader: Loaded {} dataset records from {path:?}.",
            catalog.len()
        );
        Ok(catalog)
    }
}
