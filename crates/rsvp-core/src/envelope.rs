//! The uniform JSON envelope every endpoint answers with.
//!
//! `{ "success": true, "data": ... }` or `{ "success": false, "error": "..." }`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

impl<T> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    Self { success: true, data: Some(data), error: None }
  }

  pub fn err(message: impl Into<String>) -> Self {
    Self { success: false, data: None, error: Some(message.into()) }
  }

  /// Collapse into a `Result`, using `fallback` when a failure carries no
  /// message.
  pub fn into_result(self, fallback: &str) -> Result<Option<T>, String> {
    if self.success {
      Ok(self.data)
    } else {
      Err(self.error.unwrap_or_else(|| fallback.to_owned()))
    }
  }
}

impl ApiResponse<()> {
  /// A success with no payload.
  pub fn empty() -> Self { Self { success: true, data: None, error: None } }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn success_omits_error() {
    let value = serde_json::to_value(ApiResponse::ok(3)).unwrap();
    assert_eq!(value, json!({ "success": true, "data": 3 }));
  }

  #[test]
  fn failure_omits_data() {
    let value = serde_json::to_value(ApiResponse::<u8>::err("Unauthorized")).unwrap();
    assert_eq!(value, json!({ "success": false, "error": "Unauthorized" }));
  }

  #[test]
  fn into_result_uses_fallback_for_bare_failure() {
    let bare: ApiResponse<u8> =
      serde_json::from_value(json!({ "success": false })).unwrap();
    assert_eq!(bare.into_result("Failed to fetch RSVPs"), Err("Failed to fetch RSVPs".into()));

    let ok: ApiResponse<u8> =
      serde_json::from_value(json!({ "success": true, "data": 1 })).unwrap();
    assert_eq!(ok.into_result("unused"), Ok(Some(1)));
  }
}
