//! Tunable business parameters for the rule engines.

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::{
  category::Category,
  fuzzy::{DEFAULT_SIMILARITY_THRESHOLD, SubjectMatcher},
};

/// Engine configuration, usually nested under `[engine]` in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Minimum normalised similarity for two subject names to be treated as
  /// the same subject. Must lie in `(0, 1]`.
  #[serde(deserialize_with = "similarity_threshold")]
  pub similarity_threshold: f64,
  /// Categories whose options are not gated on prior pass/fail results.
  pub exempt_categories:    Vec<Category>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
      exempt_categories:    vec![Category::Aec, Category::Idc],
    }
  }
}

impl EngineConfig {
  pub fn matcher(&self) -> SubjectMatcher {
    SubjectMatcher::new(self.similarity_threshold)
  }

  pub fn is_exempt(&self, category: Category) -> bool {
    self.exempt_categories.contains(&category)
  }
}

/// A threshold of 0 matches every pair of names and one above 1 matches
/// none, so both are rejected at load time.
fn similarity_threshold<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
  let value = f64::deserialize(deserializer)?;
  if value > 0.0 && value <= 1.0 {
    Ok(value)
  } else {
    Err(de::Error::custom(format!(
      "similarity_threshold must be in (0, 1], got {value}"
    )))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn parse(value: serde_json::Value) -> Result<EngineConfig, serde_json::Error> {
    serde_json::from_value(value)
  }

  #[test]
  fn missing_fields_take_defaults() {
    assert_eq!(parse(json!({})).unwrap(), EngineConfig::default());
  }

  #[test]
  fn threshold_outside_unit_interval_is_rejected() {
    for bad in [0.0, -0.5, 1.5] {
      let err = parse(json!({ "similarity_threshold": bad })).unwrap_err();
      assert!(err.to_string().contains("similarity_threshold"), "{err}");
    }
  }

  #[test]
  fn threshold_bounds_are_inclusive_at_one() {
    assert_eq!(parse(json!({ "similarity_threshold": 1.0 })).unwrap().similarity_threshold, 1.0);
    assert_eq!(parse(json!({ "similarity_threshold": 0.6 })).unwrap().similarity_threshold, 0.6);
  }
}
