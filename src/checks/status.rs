use super::schema::{Field, Requirement};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one field for one archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldStatus {
  Unset,
  Satisfied,
  /// Satisfied, carrying the normalized value later checks need
  SatisfiedWithValue(String),
}

impl FieldStatus {
  pub fn is_satisfied(&self) -> bool {
    !matches!(self, FieldStatus::Unset)
  }

  pub fn value(&self) -> Option<&str> {
    match self {
      FieldStatus::SatisfiedWithValue(v) => Some(v),
      _ => None,
    }
  }
}

/// Per-archive field state plus the critical flag
///
/// Satisfaction is sticky: once a field has been satisfied a later bad line
/// raises the critical flag but does not unset the field.
#[derive(Debug, Clone)]
pub struct Accumulator {
  required: BTreeMap<Field, FieldStatus>,
  optional: BTreeMap<Field, FieldStatus>,
  critical: bool,
}

impl Accumulator {
  pub fn new() -> Self {
    Self {
      required: Field::REQUIRED.into_iter().map(|f| (f, FieldStatus::Unset)).collect(),
      optional: Field::OPTIONAL.into_iter().map(|f| (f, FieldStatus::Unset)).collect(),
      critical: false,
    }
  }

  fn group_mut(&mut self, field: Field) -> &mut BTreeMap<Field, FieldStatus> {
    match field.requirement() {
      Requirement::Required => &mut self.required,
      Requirement::Optional => &mut self.optional,
    }
  }

  pub fn satisfy(&mut self, field: Field) {
    let slot = self.group_mut(field).entry(field).or_insert(FieldStatus::Unset);
    if !slot.is_satisfied() {
      *slot = FieldStatus::Satisfied;
    }
  }

  /// Satisfy with a value; a later valid line replaces the earlier value
  pub fn satisfy_with(&mut self, field: Field, value: impl Into<String>) {
    self
      .group_mut(field)
      .insert(field, FieldStatus::SatisfiedWithValue(value.into()));
  }

  pub fn status(&self, field: Field) -> &FieldStatus {
    match field.requirement() {
      Requirement::Required => self.required.get(&field),
      Requirement::Optional => self.optional.get(&field),
    }
    .unwrap_or(&FieldStatus::Unset)
  }

  pub fn mark_critical(&mut self) {
    self.critical = true;
  }

  pub fn is_critical(&self) -> bool {
    self.critical
  }

  pub fn into_groups(self) -> (BTreeMap<Field, FieldStatus>, BTreeMap<Field, FieldStatus>) {
    (self.required, self.optional)
  }
}

impl Default for Accumulator {
  fn default() -> Self {
    Self::new()
  }
}
