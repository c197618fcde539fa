/*
 * This module provides the application logic layer, centered around
 * `DatasetFinderLogic`, which acts as the Presenter for the selection form.
 * `selection_adapter` turns raw form input into query criteria and `types`
 * defines the events and commands exchanged with the presentation layer.
 * Unit tests for `DatasetFinderLogic` are in `handler_tests.rs`.
 */
pub mod handler;
pub mod selection_adapter;
pub mod types;
pub mod ui_constants;


pub use handler::{DatasetFinderLogic, StartupError};
pub use selection_adapter::{InputValidationError, RawSelection};
pub use types::{AppEvent, CheckState, MessageSeverity, ThemeItemDescriptor, UiCommand};
