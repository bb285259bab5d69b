mod intent;
mod reducer;
mod state;

pub use intent::SettingsIntent;
pub use reducer::SettingsReducer;
pub use state::SettingsDialogState;
