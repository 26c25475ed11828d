//! Postback envelope: `action:<a>&state:<token>`.
//!
//! `a` is `n` (render the next checklist) or `r` (record / submit).

use serde::Serialize;

/// A checklist action reconstructed from a postback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ChecklistAction {
    /// Re-render the checklist seeded with this token.
    Next { token: String },
    /// Submit this token to the spreadsheet.
    Submit { token: String },
}

impl ChecklistAction {
    pub fn token(&self) -> &str {
        match self {
            ChecklistAction::Next { token } | ChecklistAction::Submit { token } => token,
        }
    }

    /// Encode as postback data.
    pub fn to_data(&self) -> String {
        match self {
            ChecklistAction::Next { token } => format!("action:n&state:{token}"),
            ChecklistAction::Submit { token } => format!("action:r&state:{token}"),
        }
    }

    /// Decode postback data. Unknown actions yield `None`; a missing state is
    /// the empty token.
    pub fn parse(data: &str) -> Option<Self> {
        let mut action = None;
        let mut state = String::new();

        for pair in data.split('&') {
            let Some((key, value)) = pair.split_once(':') else {
                tracing::debug!("Skipping malformed postback pair: {pair:?}");
                continue;
            };
            match key {
                "action" => action = Some(value),
                "state" => state = value.to_string(),
                _ => {}
            }
        }

        match action? {
            "n" => Some(ChecklistAction::Next { token: state }),
            "r" => Some(ChecklistAction::Submit { token: state }),
            other => {
                tracing::debug!("Unknown checklist action: {other:?}");
                None
            }
        }
    }
}
