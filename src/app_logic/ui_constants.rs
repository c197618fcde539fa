/*
 * Shared user-facing strings for the selection form. The presentation layer
 * shows these verbatim; tests use them to recognise which message was emitted.
 */

pub const MAIN_WINDOW_TITLE: &str = "Identify Your Requirement";

// Title of the dialog reporting the number of matching datasets.
pub const RESULT_DIALOG_TITLE: &str = "Filtered Datasets";

pub const RESULT_MESSAGE_PREFIX: &str = "Number of datasets matching criteria: ";

// Title of the dialog shown when the form cannot be turned into a query.
pub const INVALID_INPUT_TITLE: &str = "Invalid Input";

pub const INVALID_YEAR_MESSAGE: &str = "Please enter a valid year for temporal scope.";

pub const EMPTY_CATALOG_TITLE: &str = "Empty Catalog";

pub const EMPTY_CATALOG_MESSAGE: &str =
    "The dataset catalog contains no records. Every query will match 0 datasets.";
