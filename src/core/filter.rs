/*
 * The query engine. A record is kept when every active constraint of the
 * `QueryCriteria` accepts it; inactive constraints (empty theme set, `None`
 * values) are skipped entirely. Results keep catalog order.
 *
 * A constraint that looks at a field the record does not have rejects the
 * record; it is never skipped because of missing data.
 */
use super::catalog::{Catalog, DatasetRecord};
use super::granularity::GranularityRank;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Closed interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl TimeInterval {
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Self {
        TimeInterval { start, end }
    }

    pub fn instant(at: PrimitiveDateTime) -> Self {
        TimeInterval { start: at, end: at }
    }

    /*
     * The interval a bare year stands for. `Instant` is the single moment
     * `YYYY-01-01 00:00:00` (a query only matches records covering New Year's
     * midnight); `FullYear` spans up to `YYYY-12-31 23:59:59`.
     */
    pub fn for_year(year: i32, mode: YearIntervalMode) -> Option<Self> {
        let first = Date::from_calendar_date(year, Month::January, 1).ok()?;
        let start = PrimitiveDateTime::new(first, Time::MIDNIGHT);
        match mode {
            YearIntervalMode::Instant => Some(Self::instant(start)),
            YearIntervalMode::FullYear => {
                let last = Date::from_calendar_date(year, Month::December, 31).ok()?;
                let end = PrimitiveDateTime::new(last, Time::from_hms(23, 59, 59).ok()?);
                Some(Self::new(start, end))
            }
        }
    }

    /// True when both intervals share at least one instant.
    pub fn overlaps(&self, other_start: PrimitiveDateTime, other_end: PrimitiveDateTime) -> bool {
        other_start <= self.end && other_end >= self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearIntervalMode {
    #[default]
    Instant,
    FullYear,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryCriteria {
    pub themes: HashSet<String>,
    pub spatial_granularity: Option<GranularityRank>,
    pub temporal_granularity: Option<GranularityRank>,
    pub spatial_scope: Option<String>,
    pub temporal_scope: Option<TimeInterval>,
}

impl QueryCriteria {
    pub fn active_constraint_count(&self) -> usize {
        usize::from(!self.themes.is_empty())
            + usize::from(self.spatial_granularity.is_some())
            + usize::from(self.temporal_granularity.is_some())
            + usize::from(self.spatial_scope.is_some())
            + usize::from(self.temporal_scope.is_some())
    }

    pub fn accepts(&self, record: &DatasetRecord) -> bool {
        (self.themes.is_empty() || matches_theme(record, &self.themes))
            && self
                .spatial_granularity
                .is_none_or(|max| within_granularity(record.spatio_granularity_min, max))
            && self
                .temporal_granularity
                .is_none_or(|max| within_granularity(record.temporal_granularity_min, max))
            && self
                .spatial_scope
                .as_deref()
                .is_none_or(|level| matches_spatial_scope(record, level))
            && self
                .temporal_scope
                .is_none_or(|interval| matches_temporal_scope(record, &interval))
    }
}

fn any_value_is_theme(objects: &[Map<String, Value>], themes: &HashSet<String>) -> bool {
    objects.iter().any(|object| {
        object
            .values()
            .any(|value| matches!(value, Value::String(s) if themes.contains(s)))
    })
}

/*
 * The record's own theme, or any top-level string value of any `measures` or
 * `complementaryInfo` entry, must be one of the selected themes. Only those two
 * collections are scanned.
 */
pub fn matches_theme(record: &DatasetRecord, themes: &HashSet<String>) -> bool {
    record
        .theme_dataset
        .as_ref()
        .is_some_and(|theme| themes.contains(theme))
        || any_value_is_theme(&record.measures, themes)
        || any_value_is_theme(&record.complementary_info, themes)
}

// Smaller ranks are finer, so anything at or below the requested rank qualifies.
pub fn within_granularity(record_min: Option<GranularityRank>, requested: GranularityRank) -> bool {
    record_min.is_some_and(|rank| rank <= requested)
}

pub fn matches_spatial_scope(record: &DatasetRecord, level: &str) -> bool {
    record
        .spatio_scope
        .iter()
        .any(|entry| entry.level.as_deref() == Some(level))
}

pub fn matches_temporal_scope(record: &DatasetRecord, interval: &TimeInterval) -> bool {
    record
        .temporal_scope
        .as_ref()
        .is_some_and(|scope| interval.overlaps(scope.min_date, scope.max_date))
}

pub fn filter_datasets<'a>(
    catalog: &'a Catalog,
    criteria: &QueryCriteria,
) -> Vec<&'a DatasetRecord> {
    log::trace!(
        "Filter: Evaluating {} records against {} active constraints.",
        catalog.len(),
        criteria.active_constraint_count()
    );
    let matched: Vec<&DatasetRecord> = catalog
        .records()
        .iter()
        .filter(|record| criteria.accepts(record))
        .collect();
    log::debug!(
        "Filter: {} of {} records match.",
        matched.len(),
        catalog.len()
    );
    matched
}

pub fn count_matches(catalog: &Catalog, criteria: &QueryCriteria) -> usize {
    filter_datasets(catalog, criteria).len()
}
