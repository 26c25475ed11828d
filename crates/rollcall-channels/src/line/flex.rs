//! Flex Message layout for the checklist.

use rollcall_checklist::{ChecklistView, Control, Emphasis};
use rollcall_core::types::OutgoingMessage;
use serde_json::{Value, json};

/// Render a checklist view as a single Flex bubble.
pub fn checklist_message(view: &ChecklistView) -> OutgoingMessage {
    let mut contents = vec![json!({
        "type": "text",
        "text": view.title,
        "weight": "bold",
        "size": "lg",
    })];

    for row in &view.rows {
        contents.push(json!({
            "type": "box",
            "layout": "horizontal",
            "spacing": "md",
            "contents": row.iter().map(toggle_button).collect::<Vec<_>>(),
        }));
    }
    contents.push(button(&view.submit));
    contents.push(button(&view.reset));

    OutgoingMessage::Flex {
        alt_text: view.title.clone(),
        contents: json!({
            "type": "bubble",
            "direction": "ltr",
            "body": {
                "type": "box",
                "layout": "vertical",
                "spacing": "xl",
                "contents": contents,
            },
        }),
    }
}

/// Row buttons share the width in proportion to their label length.
fn toggle_button(control: &Control) -> Value {
    let mut value = button(control);
    value["flex"] = json!(control.label.chars().count().max(1));
    value
}

fn button(control: &Control) -> Value {
    let style = match control.emphasis {
        Emphasis::Primary => "primary",
        Emphasis::Secondary => "secondary",
    };
    json!({
        "type": "button",
        "action": {
            "type": "postback",
            "label": control.label,
            "data": control.action.to_data(),
            "displayText": control.display_text,
        },
        "style": style,
        "adjustMode": "shrink-to-fit",
        "scaling": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_checklist::{EventCatalog, render};
    use rollcall_core::config::ChecklistConfig;

    fn bubble(token: &str) -> Value {
        let catalog = EventCatalog::from_config(&ChecklistConfig::default()).unwrap();
        match checklist_message(&render("週點名", &catalog, token)) {
            OutgoingMessage::Flex { alt_text, contents } => {
                assert_eq!(alt_text, "週點名");
                contents
            }
            other => panic!("expected flex, got {other:?}"),
        }
    }

    #[test]
    fn test_layout() {
        let bubble = bubble("");
        let body = &bubble["body"]["contents"];
        // title + 4 rows + submit + reset
        assert_eq!(body.as_array().unwrap().len(), 7);
        assert_eq!(body[0]["text"], "週點名");
        assert_eq!(body[1]["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body[5]["action"]["label"], "確認送出");
        assert_eq!(body[6]["action"]["data"], "action:n&state:");
    }

    #[test]
    fn test_buttons_carry_state() {
        let bubble = bubble("C");
        let first_row = &bubble["body"]["contents"][1]["contents"];
        assert_eq!(first_row[0]["style"], "primary");
        assert_eq!(first_row[0]["action"]["data"], "action:n&state:C");
        assert_eq!(first_row[1]["style"], "secondary");
        assert_eq!(first_row[1]["action"]["data"], "action:n&state:CD");
        assert_eq!(first_row[1]["action"]["displayText"], "禱告聚會 簽到");
        assert_eq!(first_row[1]["flex"], 4);

        let submit = &bubble["body"]["contents"][5];
        assert_eq!(submit["action"]["data"], "action:r&state:C");
        assert_eq!(submit["style"], "primary");
    }
}
