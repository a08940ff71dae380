//! Expansion of the nested `params` structure into typed fields.

use serde::Deserialize;
use serde_json::Value;
use trove_core::event::{Params, RawEvent};

use crate::{Error, Result};

/// Extract `apartment`, `apartments`, `page` and `requests` from a raw
/// event's `params`.
///
/// Accepts a nested object or a JSON-encoded string holding one. A missing or
/// non-object structure is an error; the pipeline substitutes
/// [`Params::default`] and keeps the record.
pub fn expand_params(event: &RawEvent) -> Result<Params> {
  match event.params.as_ref() {
    None | Some(Value::Null) => Err(Error::MalformedParams("params is missing".into())),
    Some(Value::String(encoded)) => {
      let decoded: Value = serde_json::from_str(encoded)
        .map_err(|e| Error::MalformedParams(format!("undecodable params string: {e}")))?;
      from_object(&decoded)
    }
    Some(other) => from_object(other),
  }
}

fn from_object(value: &Value) -> Result<Params> {
  if !value.is_object() {
    return Err(Error::MalformedParams(format!(
      "expected an object, found {}",
      kind(value)
    )));
  }
  Params::deserialize(value).map_err(|e| Error::MalformedParams(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn with_params(params: Option<Value>) -> RawEvent {
    RawEvent {
      params,
      ..RawEvent::default()
    }
  }

  #[test]
  fn object_params_are_expanded() {
    let event = with_params(Some(json!({
      "apartment": "A1",
      "apartments": [],
      "page": "p1",
      "requests": 3,
    })));

    let params = expand_params(&event).unwrap();
    assert_eq!(params.apartment, Some(json!("A1")));
    assert_eq!(params.apartments, Some(json!([])));
    assert_eq!(params.page, Some(json!("p1")));
    assert_eq!(params.requests, Some(json!(3)));
  }

  #[test]
  fn absent_keys_default_to_none() {
    let event = with_params(Some(json!({ "page": "home", "unrelated": true })));

    let params = expand_params(&event).unwrap();
    assert_eq!(params.page, Some(json!("home")));
    assert!(params.apartment.is_none());
    assert!(params.apartments.is_none());
    assert!(params.requests.is_none());
  }

  #[test]
  fn encoded_string_params_are_decoded() {
    let event = with_params(Some(json!(r#"{"apartment":"A7","requests":1}"#)));

    let params = expand_params(&event).unwrap();
    assert_eq!(params.apartment, Some(json!("A7")));
    assert_eq!(params.requests, Some(json!(1)));
  }

  #[test]
  fn missing_or_malformed_params_are_errors() {
    for params in [None, Some(Value::Null), Some(json!(5)), Some(json!("not json")), Some(json!([1]))] {
      let err = expand_params(&with_params(params.clone())).unwrap_err();
      assert!(matches!(err, Error::MalformedParams(_)), "params {params:?}");
    }
  }
}
