/*
 * This module consolidates the core, platform-agnostic logic of the application:
 * the theme taxonomy and its selection state, granularity scales, the dataset
 * catalog and its loader, the filter engine, and configuration handling.
 * Loaders and the configuration manager are exposed through `...Operations`
 * traits so callers can substitute test doubles.
 */
pub mod catalog;
pub mod config;
pub mod filter;
pub mod granularity;
pub mod path_utils;
pub mod selection;
pub mod taxonomy;

pub use catalog::{
    Catalog, CatalogError, CatalogLoaderOperations, CoreCatalogLoader, DatasetRecord,
    SpatialScopeEntry, TemporalScope,
};

pub use config::{AppConfig, ConfigError, ConfigManagerOperations, CoreConfigManager};

pub use filter::{QueryCriteria, TimeInterval, YearIntervalMode, count_matches, filter_datasets};

pub use granularity::{
    GranularityAxis, GranularityLevel, GranularityRank, GranularityScale, GranularityScales,
};

pub use selection::SelectionState;

pub use taxonomy::{
    CoreTaxonomyLoader, LoadedTaxonomy, Taxonomy, TaxonomyError, TaxonomyLoaderOperations,
    ThemeNode, expand,
};
