//! The seven fixed form slots the constraint rules are written against.

use serde::{Deserialize, Serialize};

use crate::{
  category::{Category, Semester},
  classify::SlotTag,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
  #[serde(rename = "minor1")]
  MinorI,
  #[serde(rename = "minor2")]
  MinorII,
  #[serde(rename = "idc1")]
  Idc1,
  #[serde(rename = "idc2")]
  Idc2,
  #[serde(rename = "idc3")]
  Idc3,
  #[serde(rename = "aec")]
  Aec,
  #[serde(rename = "cvac")]
  Cvac,
}

impl Slot {
  pub const ALL: [Slot; 7] = [
    Slot::MinorI,
    Slot::MinorII,
    Slot::Idc1,
    Slot::Idc2,
    Slot::Idc3,
    Slot::Aec,
    Slot::Cvac,
  ];

  pub const MINORS: [Slot; 2] = [Slot::MinorI, Slot::MinorII];

  pub const IDCS: [Slot; 3] = [Slot::Idc1, Slot::Idc2, Slot::Idc3];

  /// The form field name errors are reported against.
  pub fn field(self) -> &'static str {
    match self {
      Self::MinorI => "minor1",
      Self::MinorII => "minor2",
      Self::Idc1 => "idc1",
      Self::Idc2 => "idc2",
      Self::Idc3 => "idc3",
      Self::Aec => "aec",
      Self::Cvac => "cvac",
    }
  }

  /// Human-readable name used in error messages.
  pub fn label(self) -> &'static str {
    match self {
      Self::MinorI => "Minor I",
      Self::MinorII => "Minor II",
      Self::Idc1 => "IDC 1",
      Self::Idc2 => "IDC 2",
      Self::Idc3 => "IDC 3",
      Self::Aec => "AEC",
      Self::Cvac => "CVAC",
    }
  }

  pub fn category(self) -> Category {
    match self {
      Self::MinorI | Self::MinorII => Category::Minor,
      Self::Idc1 | Self::Idc2 | Self::Idc3 => Category::Idc,
      Self::Aec => Category::Aec,
      Self::Cvac => Category::Cvac,
    }
  }

  /// The semester context of the slot; `None` means any semester.
  pub fn semesters(self) -> Option<&'static [Semester]> {
    match self {
      Self::MinorI => Some(&[Semester::I, Semester::II]),
      Self::MinorII => Some(&[Semester::III, Semester::IV]),
      Self::Idc1 => Some(&[Semester::I]),
      Self::Idc2 => Some(&[Semester::II]),
      Self::Idc3 => Some(&[Semester::III]),
      Self::Aec | Self::Cvac => None,
    }
  }

  /// True when an option offered in `semester` belongs in this slot.
  pub fn covers(self, semester: Semester) -> bool {
    self.semesters().is_none_or(|s| s.contains(&semester))
  }

  /// Place a classified meta into a slot.
  ///
  /// A slot number carried by the label ("Minor 2", "IDC 3") picks the slot,
  /// and the classified semesters must then fit inside it. Without a number
  /// the semesters alone decide. Anything that does not fit exactly one slot
  /// is left unplaced.
  pub fn resolve(category: Category, tag: &SlotTag) -> Option<Slot> {
    let candidates: &[Slot] = match category {
      Category::Minor => &Self::MINORS,
      Category::Idc => &Self::IDCS,
      Category::Aec => return Some(Self::Aec),
      Category::Cvac => return Some(Self::Cvac),
      Category::Dscc | Category::Sec => return None,
    };
    if tag.semesters.is_empty() {
      return None;
    }

    let fits = |slot: Slot| {
      slot
        .semesters()
        .is_some_and(|own| tag.semesters.iter().all(|s| own.contains(s)))
    };
    match tag.slot_number {
      Some(n) => candidates
        .get(usize::from(n).checked_sub(1)?)
        .copied()
        .filter(|&slot| fits(slot)),
      None => {
        let mut fitting = candidates.iter().copied().filter(|&slot| fits(slot));
        match (fitting.next(), fitting.next()) {
          (Some(slot), None) => Some(slot),
          _ => None,
        }
      }
    }
  }
}
