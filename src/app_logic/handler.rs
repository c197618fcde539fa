use crate::app_logic::selection_adapter::{self, RawSelection};
use crate::app_logic::types::{
    AppEvent, CheckState, MessageSeverity, ThemeItemDescriptor, UiCommand,
};
use crate::app_logic::ui_constants::{
    EMPTY_CATALOG_MESSAGE, EMPTY_CATALOG_TITLE, INVALID_INPUT_TITLE, MAIN_WINDOW_TITLE,
    RESULT_DIALOG_TITLE, RESULT_MESSAGE_PREFIX,
};
use crate::core::{
    AppConfig, Catalog, CatalogError, CatalogLoaderOperations, GranularityAxis,
    GranularityScales, LoadedTaxonomy, SelectionState, Taxonomy, TaxonomyError,
    TaxonomyLoaderOperations, ThemeNode, YearIntervalMode, filter_datasets,
};

/*
 * Failure to load one of the inputs the form cannot work without. Both are
 * fatal: they are reported before any form is shown.
 */
#[derive(Debug)]
pub enum StartupError {
    Taxonomy(TaxonomyError),
    Catalog(CatalogError),
}

impl From<TaxonomyError> for StartupError {
    fn from(err: TaxonomyError) -> Self {
        StartupError::Taxonomy(err)
    }
}

impl From<CatalogError> for StartupError {
    fn from(err: CatalogError) -> Self {
        StartupError::Catalog(err)
    }
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Taxonomy(e) => write!(f, "Failed to load the theme taxonomy: {e}"),
            StartupError::Catalog(e) => write!(f, "Failed to load the dataset catalog: {e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Taxonomy(e) => Some(e),
            StartupError::Catalog(e) => Some(e),
        }
    }
}

/*
 * Manages the selection form's state and logic in a platform-agnostic manner.
 * It owns the loaded taxonomy, granularity scales and catalog (all read-only
 * after construction) together with the live checkbox state. UI events come in
 * through `handle_event`; the returned commands describe how the presentation
 * should change.
 */
pub struct DatasetFinderLogic {
    taxonomy: Taxonomy,
    scales: GranularityScales,
    catalog: Catalog,
    selection: SelectionState,
    year_mode: YearIntervalMode,
    last_match_count: Option<usize>,
}

impl DatasetFinderLogic {
    pub fn new(loaded: LoadedTaxonomy, catalog: Catalog, year_mode: YearIntervalMode) -> Self {
        log::debug!(
            "AppLogic: Initialised with {} themes and {} catalog records (year mode {:?}).",
            loaded.taxonomy.all_names().len(),
            catalog.len(),
            year_mode
        );
        DatasetFinderLogic {
            taxonomy: loaded.taxonomy,
            scales: loaded.scales,
            catalog,
            selection: SelectionState::new(),
            year_mode,
            last_match_count: None,
        }
    }

    /*
     * Loads the taxonomy document and then the catalog from the paths in
     * `config`. The taxonomy comes first: the form is built from it and the
     * catalog's granularity level names are resolved through its scales.
     */
    pub fn load(
        config: &AppConfig,
        taxonomy_loader: &dyn TaxonomyLoaderOperations,
        catalog_loader: &dyn CatalogLoaderOperations,
    ) -> Result<Self, StartupError> {
        log::trace!(
            "AppLogic: Loading taxonomy {:?} and catalog {:?}",
            config.taxonomy_path,
            config.catalog_path
        );
        let loaded = taxonomy_loader.load_taxonomy(&config.taxonomy_path)?;
        let catalog = catalog_loader.load_catalog(&config.catalog_path, &loaded.scales)?;
        Ok(Self::new(loaded, catalog, config.year_interval))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Count produced by the most recent successful submit.
    pub fn last_match_count(&self) -> Option<usize> {
        self.last_match_count
    }

    fn build_theme_items(
        nodes: &[ThemeNode],
        selection: &SelectionState,
    ) -> Vec<ThemeItemDescriptor> {
        nodes
            .iter()
            .map(|node| ThemeItemDescriptor {
                text: node.name.clone(),
                state: CheckState::from(selection.is_checked(&node.name)),
                children: Self::build_theme_items(&node.children, selection),
            })
            .collect()
    }

    /*
     * Commands that set up the form: the window title, the theme checkbox tree
     * and the granularity choices for both axes. An empty catalog is loaded
     * fine but every query would report zero, so the user is warned up front.
     */
    pub fn initial_commands(&self) -> Vec<UiCommand> {
        let mut commands = vec![
            UiCommand::SetWindowTitle {
                title: MAIN_WINDOW_TITLE.to_string(),
            },
            UiCommand::PopulateThemeTree {
                items: Self::build_theme_items(self.taxonomy.roots(), &self.selection),
            },
            UiCommand::PopulateGranularityOptions {
                axis: GranularityAxis::Spatial,
                options: self.scales.spatial.option_names(),
            },
            UiCommand::PopulateGranularityOptions {
                axis: GranularityAxis::Temporal,
                options: self.scales.temporal.option_names(),
            },
        ];
        if self.catalog.is_empty() {
            log::warn!("AppLogic: The dataset catalog has no records.");
            commands.push(UiCommand::ShowMessage {
                severity: MessageSeverity::Warning,
                title: EMPTY_CATALOG_TITLE.to_string(),
                text: EMPTY_CATALOG_MESSAGE.to_string(),
            });
        }
        commands
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<UiCommand> {
        match event {
            AppEvent::ThemeToggledByUser { theme, new_state } => {
                self.on_theme_toggled(&theme, new_state)
            }
            AppEvent::SelectionSubmitted { form } => self.on_selection_submitted(&form),
            AppEvent::ResetSelectionRequested => self.on_reset_selection(),
        }
    }

    /*
     * Applies the toggle to the theme and all its sub-themes, then asks the UI to
     * redraw every checkbox whose state was written.
     */
    fn on_theme_toggled(&mut self, theme: &str, new_state: CheckState) -> Vec<UiCommand> {
        log::debug!("AppLogic: Theme '{theme}' toggled to {new_state:?}.");
        self.selection
            .set_checked_cascading(&self.taxonomy, theme, new_state.is_checked())
            .into_iter()
            .map(|name| UiCommand::UpdateThemeCheckState {
                theme: name,
                new_state,
            })
            .collect()
    }

    /*
     * Validates the form, runs the query and reports the number of matches.
     * On invalid input nothing is filtered and the previous count is kept; the
     * checkbox state is left intact so the user can correct the form and retry.
     */
    fn on_selection_submitted(&mut self, form: &RawSelection) -> Vec<UiCommand> {
        let criteria = match selection_adapter::build_query_criteria(
            form,
            &self.taxonomy,
            &self.selection,
            &self.scales,
            self.year_mode,
        ) {
            Ok(criteria) => criteria,
            Err(e) => {
                log::warn!("AppLogic: Rejected selection: {e}");
                return vec![UiCommand::ShowMessage {
                    severity: MessageSeverity::Error,
                    title: INVALID_INPUT_TITLE.to_string(),
                    text: e.user_message(),
                }];
            }
        };

        log::debug!(
            "AppLogic: Running query with {} themes and {} active constraints.",
            criteria.themes.len(),
            criteria.active_constraint_count()
        );
        let count = filter_datasets(&self.catalog, &criteria).len();
        self.last_match_count = Some(count);
        log::info!("AppLogic: {count} datasets match the current selection.");

        vec![UiCommand::ShowMessage {
            severity: MessageSeverity::Information,
            title: RESULT_DIALOG_TITLE.to_string(),
            text: format!("{RESULT_MESSAGE_PREFIX}{count}"),
        }]
    }

    fn on_reset_selection(&mut self) -> Vec<UiCommand> {
        let cleared = self.selection.clear();
        log::debug!("AppLogic: Cleared {} checked themes.", cleared.len());
        cleared
            .into_iter()
            .map(|theme| UiCommand::UpdateThemeCheckState {
                theme,
                new_state: CheckState::Unchecked,
            })
            .collect()
    }
}
