//! Lenient field decoders for documents written by other clients.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Minutes {
    Number(f64),
    Text(String),
}

/// Cooking time in minutes, stored either as a number or as free text
/// such as `"45"` or `"45 mins"`.
pub fn optional_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Minutes> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(Minutes::Number(n)) if n.is_finite() && n >= 0.0 => Some(n.round() as u32),
        Some(Minutes::Number(_)) => None,
        Some(Minutes::Text(text)) => leading_minutes(&text),
    })
}

fn leading_minutes(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "optional_minutes")]
        minutes: Option<u32>,
    }

    fn parse(json: &str) -> Option<u32> {
        serde_json::from_str::<Doc>(json).unwrap().minutes
    }

    #[test]
    fn test_minutes_from_number_and_text() {
        assert_eq!(parse(r#"{"minutes": 30}"#), Some(30));
        assert_eq!(parse(r#"{"minutes": "45"}"#), Some(45));
        assert_eq!(parse(r#"{"minutes": "20 mins"}"#), Some(20));
    }

    #[test]
    fn test_minutes_missing_or_unusable() {
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"minutes": null}"#), None);
        assert_eq!(parse(r#"{"minutes": ""}"#), None);
        assert_eq!(parse(r#"{"minutes": "about an hour"}"#), None);
        assert_eq!(parse(r#"{"minutes": -5}"#), None);
    }
}
