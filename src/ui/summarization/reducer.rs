//! Reducer for the summarization dialog.

use crate::ui::mvi::Reducer;

use super::intent::SummarizeIntent;
use super::state::{SummarizeDialogState, MAX_AUTO_RETRIES};

/// Reducer for summarization dialog state transitions.
pub struct SummarizeReducer;

impl Reducer for SummarizeReducer {
    type State = SummarizeDialogState;
    type Intent = SummarizeIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SummarizeIntent::Start => SummarizeDialogState::Summarizing { animation_tick: 0 },

            SummarizeIntent::AnimationTick => match state {
                SummarizeDialogState::Summarizing { animation_tick } => {
                    SummarizeDialogState::Summarizing {
                        animation_tick: animation_tick.wrapping_add(1),
                    }
                }
                SummarizeDialogState::Retrying {
                    attempt,
                    error,
                    animation_tick,
                } => SummarizeDialogState::Retrying {
                    attempt,
                    error,
                    animation_tick: animation_tick.wrapping_add(1),
                },
                other => other,
            },

            SummarizeIntent::Success { summary_preview } => {
                SummarizeDialogState::Success { summary_preview }
            }

            SummarizeIntent::Error { message } => {
                // Determine current attempt number
                let current_attempt = match &state {
                    SummarizeDialogState::Summarizing { .. } => 1,
                    SummarizeDialogState::Retrying { attempt, .. } => attempt + 1,
                    _ => 1,
                };

                if current_attempt >= MAX_AUTO_RETRIES {
                    // Max retries reached, show user choice
                    SummarizeDialogState::Failed { error: message }
                } else {
                    // Auto-retry
                    SummarizeDialogState::Retrying {
                        attempt: current_attempt,
                        error: message,
                        animation_tick: 0,
                    }
                }
            }

            SummarizeIntent::RetryClicked => {
                // User chose to retry, reset to summarizing state
                SummarizeDialogState::Summarizing { animation_tick: 0 }
            }

            SummarizeIntent::CancelClicked | SummarizeIntent::Hide => {
                SummarizeDialogState::Hidden
            }
        }
    }
}
