//! Label classifier: free-text slot and class labels → `(Category, {Semester})`.
//!
//! Classification is driven by two priority-ordered rule tables. The first
//! rule whose pattern matches wins; there is no fallthrough. Each rule
//! carries sample labels, and the test suite checks that every sample is
//! claimed by its own rule and not shadowed by an earlier one.
//!
//! An unmatched label yields an empty semester set. Callers must treat that
//! as "cannot place", never as "applies to every semester".

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::category::{Category, Semester};

/// The structured result of classifying a label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTag {
  pub category:    Option<Category>,
  pub semesters:   BTreeSet<Semester>,
  /// The number written after "Minor" or "IDC", if any.
  pub slot_number: Option<u8>,
}

impl SlotTag {
  /// True when the label could not be placed in any semester.
  pub fn is_unplaced(&self) -> bool { self.semesters.is_empty() }
}

// ─── Rule tables ─────────────────────────────────────────────────────────────

pub(crate) struct SemesterRule {
  pub name:      &'static str,
  pub pattern:   &'static str,
  pub semesters: &'static [Semester],
  pub examples:  &'static [&'static str],
}

pub(crate) struct CategoryRule {
  pub name:     &'static str,
  pub pattern:  &'static str,
  pub category: Category,
  pub examples: &'static [&'static str],
}

use Semester::{I, II, III, IV, V, VI};

/// Most specific first: explicit semester pairs, then a single named
/// semester, then semesters implied by a numbered slot.
pub(crate) const SEMESTER_RULES: &[SemesterRule] = &[
  SemesterRule {
    name:      "semesters-i-ii",
    pattern:   r"(?i)\b(?:I|1)\s*(?:&|and|,|/|-)\s*(?:II|2)\b",
    semesters: &[I, II],
    examples:  &["Minor 1 (Semester I & II)", "Semesters 1 and 2"],
  },
  SemesterRule {
    name:      "semesters-iii-iv",
    pattern:   r"(?i)\b(?:III|3)\s*(?:&|and|,|/|-)\s*(?:IV|4)\b",
    semesters: &[III, IV],
    examples:  &["Minor 2 (Semester III & IV)", "AEC (Sem 3/4)"],
  },
  SemesterRule {
    name:      "semesters-v-vi",
    pattern:   r"(?i)\b(?:V|5)\s*(?:&|and|,|/|-)\s*(?:VI|6)\b",
    semesters: &[V, VI],
    examples:  &["Minor 3 (Semester V & VI)"],
  },
  // Any other pair ("Semester II & III") straddles two slots and is left
  // unplaced rather than narrowed to its first semester.
  SemesterRule {
    name:      "unsupported-pair",
    pattern:   r"(?i)\bsem(?:ester)?s?\.?\s*-?\s*(?:VI|V|IV|III|II|I|[1-6])\s*(?:&|and|,|/|-)\s*(?:VI|V|IV|III|II|I|[1-6])\b",
    semesters: &[],
    examples:  &["Semester II & III", "Semester II/III", "Sem 4 and 5"],
  },
  SemesterRule {
    name:      "semester-vi",
    pattern:   r"(?i)\bsem(?:ester)?\.?\s*-?\s*(?:VI|6)\b",
    semesters: &[VI],
    examples:  &["Semester VI", "Sem-6"],
  },
  SemesterRule {
    name:      "semester-v",
    pattern:   r"(?i)\bsem(?:ester)?\.?\s*-?\s*(?:V|5)\b",
    semesters: &[V],
    examples:  &["Semester V"],
  },
  SemesterRule {
    name:      "semester-iv",
    pattern:   r"(?i)\bsem(?:ester)?\.?\s*-?\s*(?:IV|4)\b",
    semesters: &[IV],
    examples:  &["Semester IV", "B.A. Sem 4"],
  },
  SemesterRule {
    name:      "semester-iii",
    pattern:   r"(?i)\bsem(?:ester)?\.?\s*-?\s*(?:III|3)\b",
    semesters: &[III],
    examples:  &["AEC (Semester III)", "Sem. 3"],
  },
  SemesterRule {
    name:      "semester-ii",
    pattern:   r"(?i)\bsem(?:ester)?\.?\s*-?\s*(?:II|2)\b",
    semesters: &[II],
    examples:  &["IDC 2 (Semester II)", "CVAC Sem 2"],
  },
  SemesterRule {
    name:      "semester-i",
    pattern:   r"(?i)\bsem(?:ester)?\.?\s*-?\s*(?:I|1)\b",
    semesters: &[I],
    examples:  &["Semester I", "IDC 1 (Sem-1)"],
  },
  SemesterRule {
    name:      "minor-3",
    pattern:   r"(?i)\bminor\s*[-_]?\s*(?:III|3)\b",
    semesters: &[V, VI],
    examples:  &["Minor 3", "MINOR-III"],
  },
  SemesterRule {
    name:      "minor-2",
    pattern:   r"(?i)\bminor\s*[-_]?\s*(?:II|2)\b",
    semesters: &[III, IV],
    examples:  &["Minor 2", "Minor II"],
  },
  SemesterRule {
    name:      "minor-1",
    pattern:   r"(?i)\bminor\s*[-_]?\s*(?:I|1)\b",
    semesters: &[I, II],
    examples:  &["Minor 1", "Minor-I"],
  },
  SemesterRule {
    name:      "idc-3",
    pattern:   r"(?i)\bidc\s*[-_]?\s*(?:III|3)\b",
    semesters: &[III],
    examples:  &["IDC 3", "IDC-III"],
  },
  SemesterRule {
    name:      "idc-2",
    pattern:   r"(?i)\bidc\s*[-_]?\s*(?:II|2)\b",
    semesters: &[II],
    examples:  &["IDC 2", "idc_2"],
  },
  SemesterRule {
    name:      "idc-1",
    pattern:   r"(?i)\bidc\s*[-_]?\s*(?:I|1)\b",
    semesters: &[I],
    examples:  &["IDC 1", "IDC I"],
  },
];

/// Category keywords. Ordered so that acronyms which could appear inside a
/// longer Minor label are tried before the bare "Minor" keyword.
pub(crate) const CATEGORY_RULES: &[CategoryRule] = &[
  CategoryRule {
    name:     "idc",
    pattern:  r"(?i)\b(?:idc|inter[\s-]?disciplinary)\b",
    category: Category::Idc,
    examples: &["IDC 1 (Semester I)", "Interdisciplinary Course 2"],
  },
  CategoryRule {
    name:     "aec",
    pattern:  r"(?i)\b(?:aec|ability\s+enhancement)\b",
    category: Category::Aec,
    examples: &["AEC (Semester III & IV)", "Ability Enhancement Course"],
  },
  CategoryRule {
    name:     "cvac",
    pattern:  r"(?i)\b(?:cvac|common\s+value\s+added)\b",
    category: Category::Cvac,
    examples: &["CVAC 2", "Common Value Added Course"],
  },
  CategoryRule {
    name:     "dscc",
    pattern:  r"(?i)\b(?:dscc?|discipline\s+specific\s+core)\b",
    category: Category::Dscc,
    examples: &["DSCC Semester I", "Discipline Specific Core"],
  },
  CategoryRule {
    name:     "sec",
    pattern:  r"(?i)\b(?:sec|skill\s+enhancement)\b",
    category: Category::Sec,
    examples: &["SEC (Semester II)", "Skill Enhancement Course"],
  },
  CategoryRule {
    name:     "minor",
    pattern:  r"(?i)\bminor\b",
    category: Category::Minor,
    examples: &["Minor 2 (Semester III & IV)", "Minor 3", "Minor"],
  },
];

static SEMESTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  SEMESTER_RULES
    .iter()
    .map(|r| Regex::new(r.pattern).expect("static regex"))
    .collect()
});

static CATEGORY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  CATEGORY_RULES
    .iter()
    .map(|r| Regex::new(r.pattern).expect("static regex"))
    .collect()
});

/// Whole-token roman (I–IV) or decimal (1–4) numeral. Roman numerals are
/// matched case-sensitively so the English word "i" never counts.
static BARE_NUMERAL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b(IV|III|II|I|[1-4])\b").expect("static regex"));

/// The slot number of a numbered Minor or IDC label.
static SLOT_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)\b(?:minor|idc)\s*[-_]?\s*(VI|V|IV|III|II|I|[1-9])\b").expect("static regex")
});

// ─── Classification ──────────────────────────────────────────────────────────

/// Classify a label into a category and a set of semesters. Never fails.
pub fn classify(label: &str) -> SlotTag {
  SlotTag {
    category:    classify_category(label),
    semesters:   classify_semesters(label),
    slot_number: classify_slot_number(label),
  }
}

/// Resolve the number of a "Minor N" or "IDC N" label.
pub fn classify_slot_number(label: &str) -> Option<u8> {
  let token = SLOT_NUMBER.captures(label)?.get(1)?.as_str().to_ascii_uppercase();
  match token.as_str() {
    "VI" => Some(6),
    "V" => Some(5),
    "IV" => Some(4),
    "III" => Some(3),
    "II" => Some(2),
    "I" => Some(1),
    digit => digit.parse().ok(),
  }
}

/// Resolve only the category part of a label.
pub fn classify_category(label: &str) -> Option<Category> {
  first_category_rule(label).map(|idx| CATEGORY_RULES[idx].category)
}

/// Resolve only the semester part of a label.
///
/// Falls back to the first bare numeral token when no named rule matches.
pub fn classify_semesters(label: &str) -> BTreeSet<Semester> {
  if let Some(idx) = first_semester_rule(label) {
    return SEMESTER_RULES[idx].semesters.iter().copied().collect();
  }

  BARE_NUMERAL
    .captures(label)
    .and_then(|caps| caps.get(1))
    .and_then(|m| Semester::from_numeral(m.as_str()))
    .into_iter()
    .collect()
}

pub(crate) fn first_semester_rule(label: &str) -> Option<usize> {
  SEMESTER_PATTERNS.iter().position(|re| re.is_match(label))
}

pub(crate) fn first_category_rule(label: &str) -> Option<usize> {
  CATEGORY_PATTERNS.iter().position(|re| re.is_match(label))
}
