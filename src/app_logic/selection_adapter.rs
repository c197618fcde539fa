/*
 * Turns the raw contents of the selection form into `QueryCriteria`.
 * Every field is optional: an empty field leaves its constraint inactive.
 * Granularity and scope fields are trimmed first; the year is taken exactly
 * as typed. Any field that is filled in but cannot be understood
 * aborts the whole conversion, so no query runs on partially valid input.
 */
use crate::app_logic::ui_constants::INVALID_YEAR_MESSAGE;
use crate::core::{
    GranularityAxis, GranularityRank, GranularityScale, GranularityScales, QueryCriteria,
    SelectionState, Taxonomy, TimeInterval, YearIntervalMode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValidationError {
    InvalidYear(String),
    UnknownGranularity {
        axis: GranularityAxis,
        value: String,
    },
}

impl InputValidationError {
    /// Text shown to the user in the error dialog.
    pub fn user_message(&self) -> String {
        match self {
            InputValidationError::InvalidYear(_) => INVALID_YEAR_MESSAGE.to_string(),
            InputValidationError::UnknownGranularity { axis, value } => format!(
                "Unknown {axis} granularity '{value}'. Please choose one of the listed levels."
            ),
        }
    }
}

impl std::fmt::Display for InputValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputValidationError::InvalidYear(text) => {
                write!(f, "'{text}' is not a valid year for the temporal scope")
            }
            InputValidationError::UnknownGranularity { axis, value } => {
                write!(f, "'{value}' is not a known {axis} granularity")
            }
        }
    }
}

impl std::error::Error for InputValidationError {}

pub type Result<T> = std::result::Result<T, InputValidationError>;

// Raw text of the form fields, exactly as typed or picked by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSelection {
    pub spatial_granularity: String,
    pub temporal_granularity: String,
    pub spatial_scope: String,
    pub temporal_scope: String,
}

fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/*
 * Parses a year such as "2019" into the interval it stands for.
 * The text must be exactly four ASCII digits forming a year in 0001..=9999.
 * Surrounding whitespace, signs and shorter years are rejected.
 */
pub fn parse_year_interval(text: &str, mode: YearIntervalMode) -> Result<Option<TimeInterval>> {
    if text.is_empty() {
        return Ok(None);
    }
    let invalid = || InputValidationError::InvalidYear(text.to_string());

    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = text.parse().map_err(|_| invalid())?;
    if year < 1 {
        return Err(invalid());
    }
    TimeInterval::for_year(year, mode).map(Some).ok_or_else(invalid)
}

/*
 * Resolves a granularity choice: a level name from the scale, or a bare rank.
 * Level names win, so a scale may define a level literally named "3".
 */
pub fn parse_granularity(
    text: &str,
    axis: GranularityAxis,
    scale: &GranularityScale,
) -> Result<Option<GranularityRank>> {
    let Some(value) = non_blank(text) else {
        return Ok(None);
    };
    if let Some(rank) = scale.rank_of(value) {
        return Ok(Some(rank));
    }
    value
        .parse::<u32>()
        .map(|rank| Some(GranularityRank(rank)))
        .map_err(|_| InputValidationError::UnknownGranularity {
            axis,
            value: value.to_string(),
        })
}

pub fn build_query_criteria(
    form: &RawSelection,
    taxonomy: &Taxonomy,
    selection: &SelectionState,
    scales: &GranularityScales,
    year_mode: YearIntervalMode,
) -> Result<QueryCriteria> {
    let temporal_scope = parse_year_interval(&form.temporal_scope, year_mode)?;
    let spatial_granularity = parse_granularity(
        &form.spatial_granularity,
        GranularityAxis::Spatial,
        scales.for_axis(GranularityAxis::Spatial),
    )?;
    let temporal_granularity = parse_granularity(
        &form.temporal_granularity,
        GranularityAxis::Temporal,
        scales.for_axis(GranularityAxis::Temporal),
    )?;

    Ok(QueryCriteria {
        themes: taxonomy.expand(selection),
        spatial_granularity,
        temporal_granularity,
        spatial_scope: non_blank(&form.spatial_scope).map(str::to_string),
        temporal_scope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::taxonomy::sample_taxonomy;
    use time::macros::datetime;

    fn scales() -> GranularityScales {
        GranularityScales {
            spatial: GranularityScale::from(vec![vec![
                (1, "Commune".to_string()),
                (3, "Region".to_string()),
            ]]),
            temporal: GranularityScale::from(vec![vec![
                (1, "Day".to_string()),
                (4, "Year".to_string()),
            ]]),
        }
    }

    #[test]
    fn test_year_produces_single_instant_by_default() {
        let interval = parse_year_interval("2019", YearIntervalMode::Instant)
            .unwrap()
            .unwrap();
        assert_eq!(interval.start, datetime!(2019-01-01 0:00));
        assert_eq!(interval.end, datetime!(2019-01-01 0:00));
    }

    #[test]
    fn test_year_full_year_mode() {
        let interval = parse_year_interval("2020", YearIntervalMode::FullYear)
            .unwrap()
            .unwrap();
        assert_eq!(interval.end, datetime!(2020-12-31 23:59:59));
    }

    #[test]
    fn test_empty_year_means_no_constraint() {
        assert_eq!(parse_year_interval("", YearIntervalMode::Instant), Ok(None));
    }

    #[test]
    fn test_invalid_years_rejected() {
        let rejected = [
            "abcd", "20a9", "-2019", "+2019", "12019", "0", "0000", "2019.0", "20 19", "   ",
            " 2019", "2019 ", "987", "19",
        ];
        for text in rejected {
            assert_eq!(
                parse_year_interval(text, YearIntervalMode::Instant),
                Err(InputValidationError::InvalidYear(text.to_string())),
                "'{text}' should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_padded_year_accepted() {
        let interval = parse_year_interval("0987", YearIntervalMode::Instant)
            .unwrap()
            .unwrap();
        assert_eq!(interval.start.year(), 987);
        assert_eq!(interval.start.ordinal(), 1);
    }

    #[test]
    fn test_granularity_by_name_rank_or_blank() {
        let scales = scales();
        let spatial = scales.for_axis(GranularityAxis::Spatial);
        assert_eq!(
            parse_granularity("Region", GranularityAxis::Spatial, spatial),
            Ok(Some(GranularityRank(3)))
        );
        assert_eq!(
            parse_granularity("2", GranularityAxis::Spatial, spatial),
            Ok(Some(GranularityRank(2)))
        );
        assert_eq!(
            parse_granularity("", GranularityAxis::Spatial, spatial),
            Ok(None)
        );
    }

    #[test]
    fn test_unknown_granularity_rejected() {
        let scales = scales();
        let result = parse_granularity(
            "Galaxy",
            GranularityAxis::Temporal,
            scales.for_axis(GranularityAxis::Temporal),
        );
        let err = result.unwrap_err();
        assert_eq!(
            err,
            InputValidationError::UnknownGranularity {
                axis: GranularityAxis::Temporal,
                value: "Galaxy".to_string()
            }
        );
        assert!(err.user_message().contains("temporal granularity 'Galaxy'"));
    }

    #[test]
    fn test_build_query_criteria_full_form() {
        // Arrange
        let taxonomy = sample_taxonomy();
        let mut selection = SelectionState::new();
        selection.set_checked("Water", true);
        let form = RawSelection {
            spatial_granularity: "Region".to_string(),
            temporal_granularity: "Day".to_string(),
            spatial_scope: "  Region ".to_string(),
            temporal_scope: "2019".to_string(),
        };

        // Act
        let criteria = build_query_criteria(
            &form,
            &taxonomy,
            &selection,
            &scales(),
            YearIntervalMode::Instant,
        )
        .unwrap();

        // Assert
        assert_eq!(criteria.themes.len(), 3);
        assert!(criteria.themes.contains("Rivers"));
        assert_eq!(criteria.spatial_granularity, Some(GranularityRank(3)));
        assert_eq!(criteria.temporal_granularity, Some(GranularityRank(1)));
        assert_eq!(criteria.spatial_scope.as_deref(), Some("Region"));
        assert!(criteria.temporal_scope.is_some());
        assert_eq!(criteria.active_constraint_count(), 5);
    }

    #[test]
    fn test_build_query_criteria_empty_form_has_no_constraints() {
        let criteria = build_query_criteria(
            &RawSelection::default(),
            &sample_taxonomy(),
            &SelectionState::new(),
            &GranularityScales::default(),
            YearIntervalMode::Instant,
        )
        .unwrap();
        assert_eq!(criteria, QueryCriteria::default());
    }

    #[test]
    fn test_build_query_criteria_stops_on_bad_year() {
        let form = RawSelection {
            temporal_scope: "abcd".to_string(),
            ..Default::default()
        };
        let result = build_query_criteria(
            &form,
            &sample_taxonomy(),
            &SelectionState::new(),
            &scales(),
            YearIntervalMode::Instant,
        );
        assert_eq!(
            result,
            Err(InputValidationError::InvalidYear("abcd".to_string()))
        );
    }
}
