use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::ReportError;
use crate::types::{CardPayload, MetricSample};

/// Marker key on a template array element that is instantiated once per
/// sample in the payload's `data`.
const REPEAT_KEY: &str = "$repeat";
const REPEAT_SCOPE: &str = "data";

/// Reads the bundled card template. A missing file is fatal; there is no
/// fallback template.
pub fn load_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|_| {
        ReportError::TemplateNotFound {
            path: path.to_path_buf(),
        }
        .into()
    })
}

/// Expands the template against the payload: `${title}` and `${message}`
/// substitute anywhere, and a `"$repeat": "data"` array element is
/// instantiated per sample with `${timestamp}` / `${value}` in scope.
pub fn render_card(template_json: &str, payload: &CardPayload) -> Result<Value> {
    let template: Value =
        serde_json::from_str(template_json).context("Card template is not valid JSON")?;
    Ok(expand(&template, payload))
}

/// Wraps a rendered card in the Teams message envelope. The shape is an
/// external protocol contract; the webhook rejects anything else.
pub fn wrap_in_envelope(card: Value) -> Value {
    json!({
        "type": "message",
        "attachments": [
            {
                "contentType": "application/vnd.microsoft.card.adaptive",
                "content": card
            }
        ]
    })
}

fn expand(node: &Value, payload: &CardPayload) -> Value {
    match node {
        Value::String(s) => Value::String(substitute_scalars(s, payload)),
        Value::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                if is_repeat_marker(item) {
                    for sample in &payload.data {
                        out.push(instantiate(item, sample, payload));
                    }
                } else {
                    out.push(expand(item, payload));
                }
            }
            Value::Array(out)
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                out.insert(key.clone(), expand(value, payload));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn is_repeat_marker(node: &Value) -> bool {
    node.get(REPEAT_KEY).and_then(Value::as_str) == Some(REPEAT_SCOPE)
}

fn instantiate(node: &Value, sample: &MetricSample, payload: &CardPayload) -> Value {
    match node {
        Value::String(s) => {
            let s = substitute_scalars(s, payload)
                .replace("${timestamp}", &format_timestamp(sample.timestamp))
                .replace("${value}", &format_value(sample.value));
            Value::String(s)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| instantiate(item, sample, payload))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if key == REPEAT_KEY {
                    continue;
                }
                out.insert(key.clone(), instantiate(value, sample, payload));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn substitute_scalars(s: &str, payload: &CardPayload) -> String {
    s.replace("${title}", &payload.title)
        .replace("${message}", &payload.message)
}

pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_value(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const TEMPLATE: &str = r#"{
        "type": "AdaptiveCard",
        "body": [
            {"type": "TextBlock", "text": "${title}"},
            {"type": "TextBlock", "text": "${message}"},
            {
                "$repeat": "data",
                "type": "ColumnSet",
                "columns": [
                    {"type": "TextBlock", "text": "${timestamp}"},
                    {"type": "TextBlock", "text": "${value}"}
                ]
            }
        ]
    }"#;

    fn payload(data: Vec<MetricSample>) -> CardPayload {
        CardPayload {
            title: "VM Metrics between a and b".to_string(),
            message: "Below are the top CPU minutes for the last 24 hours.".to_string(),
            data,
        }
    }

    #[test]
    fn test_render_substitutes_title_and_message() {
        let card = render_card(TEMPLATE, &payload(vec![])).unwrap();
        let body = card["body"].as_array().unwrap();
        assert_eq!(body[0]["text"], "VM Metrics between a and b");
        assert_eq!(
            body[1]["text"],
            "Below are the top CPU minutes for the last 24 hours."
        );
    }

    #[test]
    fn test_render_repeats_group_per_sample() {
        let start = Utc.with_ymd_and_hms(2026, 8, 30, 10, 0, 0).unwrap();
        let data = vec![
            MetricSample {
                timestamp: start,
                value: Some(95.5),
            },
            MetricSample {
                timestamp: start + Duration::minutes(1),
                value: None,
            },
        ];
        let card = render_card(TEMPLATE, &payload(data)).unwrap();
        let body = card["body"].as_array().unwrap();

        // title, message, then one ColumnSet per sample
        assert_eq!(body.len(), 4);
        assert_eq!(body[2]["columns"][0]["text"], "2026-08-30 10:00");
        assert_eq!(body[2]["columns"][1]["text"], "95.50");
        assert_eq!(body[3]["columns"][1]["text"], "-");
        // marker key must not leak into the rendered card
        assert!(body[2].get("$repeat").is_none());
    }

    #[test]
    fn test_render_empty_data_produces_no_rows() {
        let card = render_card(TEMPLATE, &payload(vec![])).unwrap();
        let body = card["body"].as_array().unwrap();
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_render_rejects_invalid_template_json() {
        assert!(render_card("{not json", &payload(vec![])).is_err());
    }

    #[test]
    fn test_envelope_shape() {
        let card = render_card(TEMPLATE, &payload(vec![])).unwrap();
        let envelope = wrap_in_envelope(card);

        assert_eq!(envelope["type"], "message");
        let attachments = envelope["attachments"].as_array().unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(
            attachments[0]["contentType"],
            "application/vnd.microsoft.card.adaptive"
        );
        assert_eq!(attachments[0]["content"]["type"], "AdaptiveCard");
    }

    #[test]
    fn test_load_template_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_template(&missing).unwrap_err();
        assert!(err.to_string().contains("template not found"));
    }

    #[test]
    fn test_load_template_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        std::fs::write(&path, TEMPLATE).unwrap();
        let loaded = load_template(&path).unwrap();
        assert_eq!(loaded, TEMPLATE);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(95.5)), "95.50");
        assert_eq!(format_value(Some(0.0)), "0.00");
        assert_eq!(format_value(None), "-");
    }
}
