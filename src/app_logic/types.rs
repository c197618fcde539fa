/*
 * Platform-agnostic types exchanged between the application logic and whatever
 * presents the selection form. The presentation layer turns user interaction
 * into `AppEvent`s and renders the `UiCommand`s it gets back; it never touches
 * the catalog or the taxonomy directly.
 */
use crate::app_logic::selection_adapter::RawSelection;
use crate::core::GranularityAxis;

// Represents the visual check state of a theme checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
}

impl From<bool> for CheckState {
    fn from(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }
}

impl CheckState {
    pub fn is_checked(self) -> bool {
        self == CheckState::Checked
    }
}

// Describes one checkbox in the theme tree and its nested sub-themes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeItemDescriptor {
    pub text: String,
    pub state: CheckState,
    pub children: Vec<ThemeItemDescriptor>,
}

// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    // The user ticked or unticked a theme checkbox.
    ThemeToggledByUser {
        theme: String,
        new_state: CheckState,
    },
    // The user pressed "Submit Selection" with the current contents of the form fields.
    SelectionSubmitted {
        form: RawSelection,
    },
    ResetSelectionRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    SetWindowTitle {
        title: String,
    },
    PopulateThemeTree {
        items: Vec<ThemeItemDescriptor>,
    },
    PopulateGranularityOptions {
        axis: GranularityAxis,
        options: Vec<String>,
    },
    UpdateThemeCheckState {
        theme: String,
        new_state: CheckState,
    },
    // A modal message; the query result and validation errors both use this.
    ShowMessage {
        severity: MessageSeverity,
        title: String,
        text: String,
    },
}
