//! Data models for the LiteLLM admin backend.
//!
//! Request types match what the dashboard forms send; upstream body types match the
//! LiteLLM proxy's REST schema.

mod key;
mod member;
mod model;
mod team;
mod user;

pub use key::*;
pub use member::*;
pub use model::*;
pub use team::*;
pub use user::*;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// A form value that may arrive as a JSON number or as the text of an input field.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Deserialize an optional number leniently.
///
/// Numeric strings are parsed. Zero, empty strings and null are treated as unset,
/// matching how the dashboard forms leave optional limits blank.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(NumberOrText::Number(n)) => n,
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected a number, got {:?}", text)))?
        }
    };

    Ok(Some(value).filter(|n| *n != 0.0))
}

/// Like [`lenient_f64`] but requires a non-negative integer.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_f64(deserializer)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(Some(n as u64)),
        Some(n) => Err(D::Error::custom(format!(
            "expected a non-negative integer, got {}",
            n
        ))),
    }
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A field the dashboard sends either as a single value or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Limits {
        #[serde(default, deserialize_with = "lenient_f64")]
        budget: Option<f64>,
        #[serde(default, deserialize_with = "lenient_u64")]
        rpm: Option<u64>,
    }

    #[test]
    fn test_lenient_numbers() {
        let limits: Limits =
            serde_json::from_value(serde_json::json!({ "budget": "12.5", "rpm": 100 })).unwrap();
        assert_eq!(limits.budget, Some(12.5));
        assert_eq!(limits.rpm, Some(100));
    }

    #[test]
    fn test_blank_and_zero_are_unset() {
        let limits: Limits =
            serde_json::from_value(serde_json::json!({ "budget": "", "rpm": 0 })).unwrap();
        assert_eq!(limits.budget, None);
        assert_eq!(limits.rpm, None);

        let limits: Limits = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(limits.budget, None);
    }

    #[test]
    fn test_non_numeric_text_rejected() {
        let result: Result<Limits, _> =
            serde_json::from_value(serde_json::json!({ "budget": "lots" }));
        assert!(result.is_err());

        let result: Result<Limits, _> = serde_json::from_value(serde_json::json!({ "rpm": 1.5 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<String> = serde_json::from_value(serde_json::json!("u1")).unwrap();
        assert_eq!(one.into_vec(), vec!["u1".to_string()]);

        let many: OneOrMany<String> =
            serde_json::from_value(serde_json::json!(["u1", "u2"])).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }
}
