//! Constraint validator.
//!
//! Checks a slotted proposal against the student's eligibility and the
//! restricted-grouping rules. All rules run, in a fixed order; errors
//! accumulate and no rule suppresses another. Invalid input is never an
//! `Err`: the result is simply a non-empty error list.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::{
  category::{Category, Semester},
  eligibility::Eligibility,
  reference::{RestrictedGroupingRule, SubjectRef},
  selection::ValidationError,
  slot::Slot,
};

/// A proposed subject placed in a fixed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChoice {
  pub slot:    Slot,
  pub subject: SubjectRef,
}

// ─── Restriction map ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Exclusion {
  other:     Uuid,
  semesters: BTreeSet<Semester>,
}

/// Restricted groupings indexed by `(category, subject)`.
///
/// Every rule is stored in both directions, so "A excludes B" always implies
/// "B excludes A" in the same category and semesters.
#[derive(Debug, Clone, Default)]
pub struct RestrictionMap {
  edges: BTreeMap<(Category, Uuid), Vec<Exclusion>>,
}

impl RestrictionMap {
  pub fn from_rules(rules: &[RestrictedGroupingRule]) -> Self {
    let mut map = Self::default();
    for rule in rules {
      for &other in &rule.cannot_combine_with {
        map.insert(rule.category, rule.target_subject_id, other, &rule.applicable_semesters);
        map.insert(rule.category, other, rule.target_subject_id, &rule.applicable_semesters);
      }
    }
    map
  }

  fn insert(
    &mut self,
    category: Category,
    subject: Uuid,
    other: Uuid,
    semesters: &BTreeSet<Semester>,
  ) {
    let exclusion = Exclusion { other, semesters: semesters.clone() };
    let list = self.edges.entry((category, subject)).or_default();
    if !list.contains(&exclusion) {
      list.push(exclusion);
    }
  }

  /// True when choosing `subject` forbids `other` within `category` in any
  /// semester of `context`. `None` context matches every semester.
  pub fn forbids(
    &self,
    category: Category,
    subject: Uuid,
    other: Uuid,
    context: Option<&[Semester]>,
  ) -> bool {
    self.edges.get(&(category, subject)).is_some_and(|list| {
      list.iter().any(|e| {
        e.other == other
          && (e.semesters.is_empty()
            || context.is_none_or(|ctx| ctx.iter().any(|s| e.semesters.contains(s))))
      })
    })
  }

  pub fn is_empty(&self) -> bool { self.edges.is_empty() }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Run every rule and return the accumulated errors.
pub fn validate(
  choices: &[SlotChoice],
  eligibility: &Eligibility,
  restrictions: &RestrictionMap,
) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  required_slots(choices, eligibility, &mut errors);
  minor_idc_disjoint(choices, &mut errors);
  idc_pairwise_unique(choices, &mut errors);
  auto_assigned_minor(choices, eligibility, &mut errors);
  restricted_groupings(choices, restrictions, &mut errors);
  errors
}

fn chosen(choices: &[SlotChoice], slot: Slot) -> Option<&SubjectRef> {
  choices.iter().find(|c| c.slot == slot).map(|c| &c.subject)
}

/// A slot is required only when the student actually has something to pick.
fn required_slots(
  choices: &[SlotChoice],
  eligibility: &Eligibility,
  errors: &mut Vec<ValidationError>,
) {
  for slot in Slot::ALL {
    if eligibility.has_real_options(slot) && chosen(choices, slot).is_none() {
      errors.push(ValidationError::new(
        slot.field(),
        format!("{} is required", slot.label()),
      ));
    }
  }
}

fn minor_idc_disjoint(choices: &[SlotChoice], errors: &mut Vec<ValidationError>) {
  for minor in Slot::MINORS {
    let Some(minor_subject) = chosen(choices, minor) else { continue };
    for idc in Slot::IDCS {
      if chosen(choices, idc).is_some_and(|s| s.id == minor_subject.id) {
        errors.push(ValidationError::new(
          idc.field(),
          format!("{} cannot be the same as {}", minor.label(), idc.label()),
        ));
      }
    }
  }
}

fn idc_pairwise_unique(choices: &[SlotChoice], errors: &mut Vec<ValidationError>) {
  for (i, a) in Slot::IDCS.iter().enumerate() {
    for b in &Slot::IDCS[i + 1..] {
      let same = match (chosen(choices, *a), chosen(choices, *b)) {
        (Some(x), Some(y)) => x.id == y.id,
        _ => false,
      };
      if same {
        errors.push(ValidationError::new(
          b.field(),
          format!("{} cannot be the same as {}", a.label(), b.label()),
        ));
      }
    }
  }
}

/// Subjects auto-assigned for Minor I must be picked as Minor I or Minor II.
fn auto_assigned_minor(
  choices: &[SlotChoice],
  eligibility: &Eligibility,
  errors: &mut Vec<ValidationError>,
) {
  let mut seen = BTreeSet::new();
  for option in eligibility.options_for(Slot::MinorI).filter(|o| o.is_auto_assign) {
    if !seen.insert(option.subject_id) {
      continue;
    }
    let picked = Slot::MINORS
      .iter()
      .any(|&s| chosen(choices, s).is_some_and(|c| c.id == option.subject_id));
    if !picked {
      errors.push(ValidationError::new(
        "minor",
        format!("{} is mandatory and must be selected as Minor I or Minor II", option.name),
      ));
    }
  }
}

fn restricted_groupings(
  choices: &[SlotChoice],
  restrictions: &RestrictionMap,
  errors: &mut Vec<ValidationError>,
) {
  if restrictions.is_empty() {
    return;
  }
  for category in [Category::Minor, Category::Idc] {
    let mut in_category: Vec<&SlotChoice> =
      choices.iter().filter(|c| c.slot.category() == category).collect();
    in_category.sort_by_key(|c| c.slot);

    for (i, a) in in_category.iter().enumerate() {
      for b in &in_category[i + 1..] {
        if a.subject.id == b.subject.id {
          continue;
        }
        let conflict = restrictions.forbids(category, a.subject.id, b.subject.id, a.slot.semesters())
          || restrictions.forbids(category, b.subject.id, a.subject.id, b.slot.semesters());
        if conflict {
          errors.push(ValidationError::new(
            b.slot.field(),
            format!("{} cannot be combined with {}", a.subject.name, b.subject.name),
          ));
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;
  use crate::eligibility::{CategoryOptions, SubjectOption};

  fn subject(name: &str) -> SubjectRef {
    SubjectRef { id: Uuid::new_v4(), name: name.into(), code: String::new() }
  }

  fn choice(slot: Slot, subject: &SubjectRef) -> SlotChoice {
    SlotChoice { slot, subject: subject.clone() }
  }

  fn option(subject: &SubjectRef, semester: Semester, auto: bool) -> SubjectOption {
    SubjectOption {
      subject_id:     subject.id,
      paper_id:       Uuid::new_v4(),
      name:           subject.name.clone(),
      code:           String::new(),
      semester,
      is_mandatory:   auto,
      is_auto_assign: auto,
    }
  }

  fn eligibility(entries: Vec<(Category, SubjectOption)>) -> Eligibility {
    let mut categories: BTreeMap<Category, CategoryOptions> = BTreeMap::new();
    for (category, opt) in entries {
      categories
        .entry(category)
        .or_insert_with(|| CategoryOptions {
          id: category.synthetic_id(),
          category,
          options: Vec::new(),
        })
        .options
        .push(opt);
    }
    Eligibility { categories }
  }

  fn rule(category: Category, target: &SubjectRef, others: &[&SubjectRef], sems: &[Semester]) -> RestrictedGroupingRule {
    RestrictedGroupingRule {
      academic_year_id:     Uuid::nil(),
      target_subject_id:    target.id,
      category,
      applicable_semesters: sems.iter().copied().collect(),
      cannot_combine_with:  others.iter().map(|s| s.id).collect(),
    }
  }

  #[test]
  fn minor_and_idc_same_subject_yields_exactly_one_error() {
    let economics = subject("Economics");
    let choices = [choice(Slot::MinorI, &economics), choice(Slot::Idc1, &economics)];
    let errors = validate(&choices, &Eligibility::default(), &RestrictionMap::default());
    assert_eq!(errors, vec![ValidationError::new("idc1", "Minor I cannot be the same as IDC 1")]);
  }

  #[test]
  fn required_only_when_options_exist() {
    let physics = subject("Physics");
    let history = subject("History");
    let e = eligibility(vec![
      (Category::Idc, option(&physics, Semester::I, false)),
      (Category::Idc, option(&history, Semester::II, false)),
    ]);
    // idc3 has no options, so omitting it is fine.
    let choices = [choice(Slot::Idc1, &physics)];
    let errors = validate(&choices, &e, &RestrictionMap::default());
    assert_eq!(errors, vec![ValidationError::new("idc2", "IDC 2 is required")]);
  }

  #[test]
  fn blank_options_do_not_make_a_slot_required() {
    let blank = subject("   ");
    let e = eligibility(vec![(Category::Cvac, option(&blank, Semester::II, false))]);
    assert!(validate(&[], &e, &RestrictionMap::default()).is_empty());
  }

  #[test]
  fn every_minor_idc_pair_is_checked() {
    let a = subject("Economics");
    let b = subject("Geography");
    let choices = [
      choice(Slot::MinorI, &a),
      choice(Slot::MinorII, &b),
      choice(Slot::Idc2, &b),
      choice(Slot::Idc3, &a),
    ];
    let errors = validate(&choices, &Eligibility::default(), &RestrictionMap::default());
    assert_eq!(errors, vec![
      ValidationError::new("idc3", "Minor I cannot be the same as IDC 3"),
      ValidationError::new("idc2", "Minor II cannot be the same as IDC 2"),
    ]);
  }

  #[test]
  fn idc_slots_must_be_pairwise_distinct() {
    let a = subject("Sociology");
    let choices = [choice(Slot::Idc1, &a), choice(Slot::Idc2, &a), choice(Slot::Idc3, &a)];
    let errors = validate(&choices, &Eligibility::default(), &RestrictionMap::default());
    assert_eq!(errors, vec![
      ValidationError::new("idc2", "IDC 1 cannot be the same as IDC 2"),
      ValidationError::new("idc3", "IDC 1 cannot be the same as IDC 3"),
      ValidationError::new("idc3", "IDC 2 cannot be the same as IDC 3"),
    ]);
  }

  #[test]
  fn auto_assigned_subject_accepted_in_either_minor_slot() {
    let evs = subject("Environmental Science");
    let other = subject("Geology");
    let e = eligibility(vec![(Category::Minor, option(&evs, Semester::I, true))]);

    let in_minor2 = [choice(Slot::MinorI, &other), choice(Slot::MinorII, &evs)];
    assert!(validate(&in_minor2, &e, &RestrictionMap::default()).is_empty());

    let missing = [choice(Slot::MinorI, &other)];
    assert_eq!(validate(&missing, &e, &RestrictionMap::default()), vec![ValidationError::new(
      "minor",
      "Environmental Science is mandatory and must be selected as Minor I or Minor II",
    )]);
  }

  #[test]
  fn restriction_map_is_symmetric() {
    let a = subject("Physics");
    let b = subject("Chemistry");
    let map = RestrictionMap::from_rules(&[rule(Category::Minor, &a, &[&b], &[])]);
    assert!(map.forbids(Category::Minor, a.id, b.id, None));
    assert!(map.forbids(Category::Minor, b.id, a.id, None));
    assert!(!map.forbids(Category::Idc, a.id, b.id, None));
  }

  #[test]
  fn restriction_respects_semester_context() {
    let a = subject("Physics");
    let b = subject("Chemistry");
    let map = RestrictionMap::from_rules(&[rule(Category::Idc, &a, &[&b], &[Semester::III])]);
    assert!(map.forbids(Category::Idc, b.id, a.id, Some(&[Semester::III])));
    assert!(!map.forbids(Category::Idc, b.id, a.id, Some(&[Semester::I])));
  }

  #[test]
  fn restricted_pair_reported_whichever_side_holds_the_rule() {
    let a = subject("Physics");
    let b = subject("Chemistry");
    let choices = [choice(Slot::Idc1, &a), choice(Slot::Idc2, &b)];

    for rules in [
      vec![rule(Category::Idc, &a, &[&b], &[])],
      vec![rule(Category::Idc, &b, &[&a], &[])],
    ] {
      let map = RestrictionMap::from_rules(&rules);
      let errors = validate(&choices, &Eligibility::default(), &map);
      assert_eq!(errors, vec![ValidationError::new("idc2", "Physics cannot be combined with Chemistry")]);
    }
  }

  #[test]
  fn restriction_outside_slot_semesters_is_ignored() {
    let a = subject("Physics");
    let b = subject("Chemistry");
    let map = RestrictionMap::from_rules(&[rule(Category::Idc, &a, &[&b], &[Semester::III])]);
    let choices = [choice(Slot::Idc1, &a), choice(Slot::Idc2, &b)];
    assert!(validate(&choices, &Eligibility::default(), &map).is_empty());
  }

  #[test]
  fn errors_accumulate_across_rules() {
    let a = subject("Economics");
    let b = subject("Statistics");
    let e = eligibility(vec![(Category::Cvac, option(&b, Semester::II, false))]);
    let map = RestrictionMap::from_rules(&[rule(Category::Idc, &a, &[&b], &[])]);
    let choices = [
      choice(Slot::MinorI, &a),
      choice(Slot::Idc1, &a),
      choice(Slot::Idc2, &b),
    ];
    let fields: Vec<String> = validate(&choices, &e, &map).into_iter().map(|e| e.field).collect();
    assert_eq!(fields, ["cvac", "idc1", "idc2"]);
  }

  #[test]
  fn validation_is_order_independent() {
    let a = subject("Economics");
    let b = subject("Statistics");
    let c = subject("Sociology");
    let map = RestrictionMap::from_rules(&[rule(Category::Idc, &b, &[&c], &[])]);
    let forward = [
      choice(Slot::MinorI, &a),
      choice(Slot::Idc1, &a),
      choice(Slot::Idc2, &b),
      choice(Slot::Idc3, &c),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let mut x = validate(&forward, &Eligibility::default(), &map);
    let mut y = validate(&reversed, &Eligibility::default(), &map);
    x.sort();
    y.sort();
    assert_eq!(x, y);
    assert_eq!(x.len(), 2);
  }
}
