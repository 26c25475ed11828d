//! Checklist rendering.
//!
//! A pure function of (title, catalog, token). Every control carries the
//! complete token it leads to, so the next request can be served with no
//! server-side session.

use serde::Serialize;

use crate::applier;
use crate::catalog::EventCatalog;
use crate::codec;
use crate::postback::ChecklistAction;

pub const SUBMIT_LABEL: &str = "確認送出";
pub const SUBMIT_DISPLAY_TEXT: &str = "送出紀錄";
pub const RESET_LABEL: &str = "重新開始";

/// Visual weight of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Primary,
    Secondary,
}

/// One button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub label: String,
    /// Text echoed into the chat when pressed.
    pub display_text: String,
    pub emphasis: Emphasis,
    pub action: ChecklistAction,
}

/// Interactive checklist descriptor, independent of any chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistView {
    pub title: String,
    pub rows: Vec<Vec<Control>>,
    pub submit: Control,
    pub reset: Control,
}

impl ChecklistView {
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.rows.iter().flatten()
    }
}

pub fn render(title: &str, catalog: &EventCatalog, token: &str) -> ChecklistView {
    let token = catalog.normalize(token);
    let checked = codec::decode(&token);

    let rows = catalog
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|entry| Control {
                    label: entry.name.clone(),
                    display_text: format!("{} 簽到", entry.name),
                    emphasis: if checked.contains(&entry.code) {
                        Emphasis::Primary
                    } else {
                        Emphasis::Secondary
                    },
                    action: ChecklistAction::Next {
                        token: applier::apply(&token, entry.code),
                    },
                })
                .collect()
        })
        .collect();

    ChecklistView {
        title: title.to_string(),
        rows,
        submit: Control {
            label: SUBMIT_LABEL.into(),
            display_text: SUBMIT_DISPLAY_TEXT.into(),
            emphasis: Emphasis::Primary,
            action: ChecklistAction::Submit { token },
        },
        reset: Control {
            label: RESET_LABEL.into(),
            display_text: RESET_LABEL.into(),
            emphasis: Emphasis::Secondary,
            action: ChecklistAction::Next {
                token: applier::reset(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::config::{CatalogEntryConfig, ChecklistConfig};

    fn two_item_catalog() -> EventCatalog {
        EventCatalog::from_rows(&[vec![
            CatalogEntryConfig {
                code: 'C',
                name: "主日".into(),
                record_name: None,
            },
            CatalogEntryConfig {
                code: 'D',
                name: "禱告聚會".into(),
                record_name: None,
            },
        ]])
        .unwrap()
    }

    fn emphases(view: &ChecklistView) -> Vec<Emphasis> {
        view.controls().map(|c| c.emphasis).collect()
    }

    #[test]
    fn test_emphasis_follows_membership() {
        let catalog = two_item_catalog();
        assert_eq!(
            emphases(&render("週點名", &catalog, "CD")),
            vec![Emphasis::Primary, Emphasis::Primary]
        );
        assert_eq!(
            emphases(&render("週點名", &catalog, "C")),
            vec![Emphasis::Primary, Emphasis::Secondary]
        );
        assert_eq!(
            emphases(&render("週點名", &catalog, "")),
            vec![Emphasis::Secondary, Emphasis::Secondary]
        );
    }

    #[test]
    fn test_controls_carry_next_token() {
        let view = render("週點名", &two_item_catalog(), "D");
        let tokens: Vec<&str> = view.controls().map(|c| c.action.token()).collect();
        assert_eq!(tokens, vec!["DC", "D"]);
        assert_eq!(view.controls().next().unwrap().display_text, "主日 簽到");
    }

    #[test]
    fn test_submit_and_reset_controls() {
        let view = render("週點名", &two_item_catalog(), "DC");
        assert_eq!(view.submit.action, ChecklistAction::Submit { token: "DC".into() });
        assert_eq!(view.submit.emphasis, Emphasis::Primary);
        assert_eq!(view.reset.action, ChecklistAction::Next { token: String::new() });
        assert_eq!(view.reset.emphasis, Emphasis::Secondary);
    }

    #[test]
    fn test_unknown_codes_are_dropped() {
        let view = render("週點名", &two_item_catalog(), "C&:Z");
        assert_eq!(view.submit.action.token(), "C");
        assert!(view.controls().all(|c| !c.action.token().contains('Z')));
    }

    #[test]
    fn test_rows_follow_catalog() {
        let catalog = EventCatalog::from_config(&ChecklistConfig::default()).unwrap();
        let view = render("週點名", &catalog, "");
        let sizes: Vec<usize> = view.rows.iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(view.title, "週點名");
    }

    #[test]
    fn test_render_is_deterministic() {
        let catalog = two_item_catalog();
        assert_eq!(render("t", &catalog, "C"), render("t", &catalog, "C"));
    }
}
