//! Prompt extraction from chat-completion style request bodies.

use serde_json::Value;
use tracing::warn;

/// Pull the prompt text out of a chat request body.
///
/// A top-level string `prompt` is returned as is. Otherwise the last entry of
/// `messages` is used: string content is trimmed; a list of content parts
/// contributes each trimmed `text` part and turns every `image_url` part with
/// a `data:image` URL into a `--file <base64>` directive, in order, joined by
/// spaces. Any other shape yields `""`.
///
/// # Example
///
/// ```
/// use pd_template::extract_prompt;
/// use serde_json::json;
///
/// let body = json!({"messages": [{"role": "user", "content": "  a cat --steps 4 "}]});
/// assert_eq!(extract_prompt(&body), "a cat --steps 4");
/// ```
#[must_use]
pub fn extract_prompt(body: &Value) -> String {
    if let Some(prompt) = body.get("prompt").and_then(Value::as_str) {
        return prompt.to_owned();
    }

    let Some(message) = body
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.last())
    else {
        return String::new();
    };

    match message.get("content") {
        Some(Value::String(content)) => content.trim().to_owned(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(content_part)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_owned(),
        _ => String::new(),
    }
}

/// Parse `body` as JSON and extract its prompt; malformed bodies yield `""`.
#[must_use]
pub fn extract_prompt_from_str(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => extract_prompt(&value),
        Err(err) => {
            warn!("ignoring malformed chat request: {err}");
            String::new()
        }
    }
}

fn content_part(part: &Value) -> Option<String> {
    match part.get("type")?.as_str()? {
        "text" => Some(
            part.get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_owned(),
        ),
        "image_url" => {
            let url = part.get("image_url")?.get("url")?.as_str()?;
            if !url.starts_with("data:image") {
                return None;
            }
            let payload = url.split(',').nth(1)?;
            Some(format!("--file {payload}"))
        }
        _ => None,
    }
}
