//! Fuzzy subject-name matching.
//!
//! Board subject names and catalog subject names are written by different
//! people ("Pol. Science" vs "Political Science"), so equivalence is decided
//! by a Sørensen–Dice similarity over normalised names. The acceptance
//! threshold is a business parameter and comes from [`EngineConfig`].
//!
//! [`EngineConfig`]: crate::config::EngineConfig

use strsim::sorensen_dice;

/// The default similarity a pair of names must reach to be considered the
/// same subject.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Lower-case a name and strip every non-alphanumeric character.
pub fn normalize(name: &str) -> String {
  name
    .chars()
    .filter(|c| c.is_alphanumeric())
    .flat_map(char::to_lowercase)
    .collect()
}

/// Similarity in `[0.0, 1.0]` between two names after normalisation.
///
/// Names that normalise to nothing are never similar to anything.
pub fn similarity(a: &str, b: &str) -> f64 {
  let (a, b) = (normalize(a), normalize(b));
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  sorensen_dice(&a, &b)
}

/// Decides whether two subject names refer to the same subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectMatcher {
  threshold: f64,
}

impl Default for SubjectMatcher {
  fn default() -> Self { Self::new(DEFAULT_SIMILARITY_THRESHOLD) }
}

impl SubjectMatcher {
  pub fn new(threshold: f64) -> Self { Self { threshold } }

  /// True when the similarity of `a` and `b` reaches the threshold.
  pub fn matches(&self, a: &str, b: &str) -> bool {
    similarity(a, b) >= self.threshold
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalisation_ignores_case_spacing_and_punctuation() {
    assert_eq!(normalize("Political Science"), "politicalscience");
    assert_eq!(normalize("political-science."), "politicalscience");
    assert_eq!(similarity("Political Science", "POLITICAL-SCIENCE"), 1.0);
  }

  #[test]
  fn exact_match_always_passes() {
    let m = SubjectMatcher::default();
    assert!(m.matches("Physics", "physics"));
    assert!(SubjectMatcher::new(1.0).matches("Physics", "PHYSICS"));
  }

  #[test]
  fn boundary_around_point_eight() {
    // botany/botani share 4 of 5 bigrams each: 2 * 4 / 10 = 0.8 exactly.
    assert_eq!(similarity("Botany", "Botani"), 0.8);
    assert!(SubjectMatcher::new(0.79).matches("Botany", "Botani"));
    assert!(SubjectMatcher::new(0.80).matches("Botany", "Botani"));
    assert!(!SubjectMatcher::new(0.81).matches("Botany", "Botani"));
  }

  #[test]
  fn unrelated_subjects_do_not_match() {
    let m = SubjectMatcher::default();
    assert!(!m.matches("Physics", "Economics"));
    assert!(!m.matches("Chemistry", "History"));
  }

  #[test]
  fn blank_names_never_match() {
    let m = SubjectMatcher::new(0.0);
    assert!(!m.matches("", ""));
    assert!(!m.matches("---", "Physics"));
  }
}
