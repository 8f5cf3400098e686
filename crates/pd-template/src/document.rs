//! Workflow template documents.

use serde_json::{Map, Value};

/// `class_type` of the node that carries directive text.
pub const ANCHOR_CLASS: &str = "TextCommandParser";

/// Input of the anchor node holding the directive text.
pub const COMMAND_TEXT_INPUT: &str = "command_text";

/// A workflow graph: node id to node object.
///
/// Nodes other than the anchor are opaque and round-trip unchanged, in their
/// original order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDocument {
    nodes: Map<String, Value>,
}

impl TemplateDocument {
    /// Wrap an already parsed node map.
    #[must_use]
    pub fn new(nodes: Map<String, Value>) -> Self {
        Self { nodes }
    }

    /// Whether the document has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node map.
    #[must_use]
    pub fn nodes(&self) -> &Map<String, Value> {
        &self.nodes
    }

    /// Directive text of the anchor node.
    ///
    /// With several anchors the last one in document order wins. Anchors
    /// whose `command_text` is not a string are skipped.
    #[must_use]
    pub fn command_text(&self) -> Option<&str> {
        self.nodes
            .values()
            .filter_map(anchor_inputs)
            .filter_map(|inputs| inputs.get(COMMAND_TEXT_INPUT)?.as_str())
            .last()
    }

    /// Replace `command_text` in every anchor node that declares it.
    ///
    /// Returns the number of nodes updated.
    pub fn set_command_text(&mut self, text: &str) -> usize {
        let mut updated = 0;
        for node in self.nodes.values_mut() {
            let Some(inputs) = anchor_inputs_mut(node) else {
                continue;
            };
            if let Some(slot) = inputs.get_mut(COMMAND_TEXT_INPUT) {
                *slot = Value::String(text.to_owned());
                updated += 1;
            }
        }
        updated
    }

    /// Pretty-printed JSON with two-space indentation. Non-ASCII text is
    /// written literally.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        // Serializing a map of `Value`s cannot fail
        serde_json::to_string_pretty(&self.nodes).unwrap_or_else(|_| "{}".to_owned())
    }
}

fn is_anchor(node: &Map<String, Value>) -> bool {
    node.get("class_type").and_then(Value::as_str) == Some(ANCHOR_CLASS)
}

fn anchor_inputs(node: &Value) -> Option<&Map<String, Value>> {
    let node = node.as_object().filter(|node| is_anchor(node))?;
    node.get("inputs")?.as_object()
}

fn anchor_inputs_mut(node: &mut Value) -> Option<&mut Map<String, Value>> {
    let node = node.as_object_mut().filter(|node| is_anchor(node))?;
    node.get_mut("inputs")?.as_object_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document(value: Value) -> TemplateDocument {
        match value {
            Value::Object(nodes) => TemplateDocument::new(nodes),
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_command_text_from_anchor() {
        let doc = document(json!({
            "3": {"class_type": "KSampler", "inputs": {"steps": 20}},
            "6": {"class_type": "TextCommandParser", "inputs": {"command_text": "--steps 8"}}
        }));
        assert_eq!(doc.command_text(), Some("--steps 8"));
    }

    #[test]
    fn test_command_text_missing() {
        let doc = document(json!({
            "1": {"class_type": "TextCommandParser", "inputs": {}},
            "2": {"class_type": "TextCommandParser", "inputs": {"command_text": 5}},
            "3": "not a node"
        }));
        assert_eq!(doc.command_text(), None);
        assert_eq!(TemplateDocument::default().command_text(), None);
    }

    #[test]
    fn test_last_anchor_wins() {
        let doc = document(json!({
            "1": {"class_type": "TextCommandParser", "inputs": {"command_text": "--steps 1"}},
            "2": {"class_type": "TextCommandParser", "inputs": {"command_text": "--steps 2"}}
        }));
        assert_eq!(doc.command_text(), Some("--steps 2"));
    }

    #[test]
    fn test_set_command_text_updates_every_anchor() {
        let mut doc = document(json!({
            "1": {"class_type": "TextCommandParser", "inputs": {"command_text": "a"}},
            "2": {"class_type": "TextCommandParser", "inputs": {"command_text": "b"}},
            "3": {"class_type": "TextCommandParser", "inputs": {"other": 1}},
            "4": {"class_type": "SaveImage", "inputs": {"command_text": "keep"}}
        }));

        assert_eq!(doc.set_command_text("new"), 2);
        assert_eq!(doc.nodes()["1"]["inputs"]["command_text"], "new");
        assert_eq!(doc.nodes()["2"]["inputs"]["command_text"], "new");
        assert_eq!(doc.nodes()["3"]["inputs"], json!({"other": 1}));
        assert_eq!(doc.nodes()["4"]["inputs"]["command_text"], "keep");
    }

    #[test]
    fn test_pretty_json_keeps_order_and_unicode() {
        let doc = document(json!({
            "9": {"class_type": "Note", "inputs": {"text": "café ☕"}},
            "1": {"class_type": "TextCommandParser", "inputs": {"command_text": ""}}
        }));
        let text = doc.to_json_pretty();
        assert!(text.contains("café ☕"));
        assert!(text.find("\"9\"").unwrap() < text.find("\"1\"").unwrap());
        assert!(text.contains("\n  \"9\": {\n    \"class_type\""));
    }

    #[test]
    fn test_empty_document_serializes_to_braces() {
        assert_eq!(TemplateDocument::default().to_json_pretty(), "{}");
    }
}
