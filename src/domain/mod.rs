pub mod definition;
pub mod history;
pub mod settings;

pub use definition::{
    DefinitionItem, DefinitionRequestState, Meaning, NormalizedDefinition, RequestPhase,
};
pub use history::{HistoryEntry, sanitize_history};
pub use settings::{SettingUpdate, SettingsState, Theme, normalize_settings};
