//! Subject-selection categories and semesters.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

// ─── Category ────────────────────────────────────────────────────────────────

/// One of the fixed subject-selection groups.
///
/// Serialised (serde and strum alike) as its upper-case code, e.g. `"MINOR"`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Category {
  Minor,
  /// Interdisciplinary course.
  Idc,
  /// Ability enhancement course.
  Aec,
  /// Common value added course.
  Cvac,
  /// Discipline specific core course.
  Dscc,
  /// Skill enhancement course.
  Sec,
}

impl Category {
  /// A referentially stable identifier for derived (never persisted)
  /// category objects.
  ///
  /// Computed from a SHA-256 digest of the category code, so the same
  /// category yields the same id in every call and every process.
  pub fn synthetic_id(self) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(b"elective.category:");
    hasher.update(self.as_ref().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
  }
}

// ─── Semester ────────────────────────────────────────────────────────────────

/// An academic semester, written as a roman numeral.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
pub enum Semester {
  I,
  II,
  III,
  IV,
  V,
  VI,
}

impl Semester {
  /// Resolve a bare numeral token through the fixed fallback table
  /// (`I`↔`1` … `IV`↔`4`). Anything else yields `None`.
  pub fn from_numeral(token: &str) -> Option<Self> {
    match token {
      "I" | "1" => Some(Self::I),
      "II" | "2" => Some(Self::II),
      "III" | "3" => Some(Self::III),
      "IV" | "4" => Some(Self::IV),
      _ => None,
    }
  }
}
