//! Form state: current mode, selected disease and entered field values.
//!
//! Values are stored as typed in. Anything that does not parse as a finite
//! number is kept as [`FieldValue::Empty`]; defaults are resolved when the
//! request is built, never here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::FormError;
use crate::schema::DiseaseId;

/// Submission mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One disease, one request, one result
    #[default]
    Single,
    /// Every disease in one batched request
    Multi,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "single"),
            Mode::Multi => write!(f, "multi"),
        }
    }
}

/// A stored field entry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldValue {
    /// Blank or unparseable input
    #[default]
    Empty,
    Number(f64),
}

impl FieldValue {
    /// Parse raw user input. Blank, non-numeric and non-finite input all
    /// become `Empty`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => FieldValue::Number(v),
            _ => FieldValue::Empty,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

/// Key of a field in the given mode.
///
/// Single mode uses the bare feature name; multi mode prefixes the disease
/// so that e.g. `Age` for two diseases does not collide.
pub fn field_key(mode: Mode, disease: DiseaseId, feature: &str) -> String {
    match mode {
        Mode::Single => feature.to_string(),
        Mode::Multi => multi_key(disease, feature),
    }
}

/// `"<Disease>-<Feature>"`
pub fn multi_key(disease: DiseaseId, feature: &str) -> String {
    format!("{}-{}", disease.as_str(), feature)
}

/// Mode, selection and raw values of the entry form
#[derive(Debug, Clone, Default)]
pub struct FormState {
    mode: Mode,
    selected_disease: Option<DiseaseId>,
    values: HashMap<String, FieldValue>,
}

impl FormState {
    /// Empty single-mode form
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected_disease(&self) -> Option<DiseaseId> {
        self.selected_disease
    }

    /// Stored value for a key, if one was ever entered.
    ///
    /// May return entries left over from another mode or disease.
    pub fn value(&self, key: &str) -> Option<FieldValue> {
        self.values.get(key).copied()
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Record user input for a field.
    ///
    /// Unparseable input is stored as `Empty`, it is not an error. The key
    /// must belong to the form currently shown: a feature of the selected
    /// disease in single mode, a `"<Disease>-<Feature>"` key in multi mode.
    pub fn set_field(&mut self, key: &str, raw: &str) -> Result<(), FormError> {
        if !self.is_relevant_key(key) {
            return Err(FormError::UnknownField {
                key: key.to_string(),
                mode: self.mode,
            });
        }
        self.values.insert(key.to_string(), FieldValue::parse(raw));
        Ok(())
    }

    /// Switch mode. Values are kept; entries from the other mode are
    /// simply not read. Entering single mode from multi starts with no
    /// disease selected. Returns whether the mode actually changed.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.mode == mode {
            return false;
        }
        if mode == Mode::Single {
            self.selected_disease = None;
        }
        self.mode = mode;
        true
    }

    /// Choose the disease for single mode (`None` clears the choice).
    /// Previously entered values are kept.
    pub fn set_selected_disease(&mut self, disease: Option<DiseaseId>) -> Result<(), FormError> {
        if self.mode != Mode::Single {
            return Err(FormError::NotSingleMode);
        }
        self.selected_disease = disease;
        Ok(())
    }

    /// Drop all entered values. Mode and selection are kept.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// Keys shown by the current form, in registry order.
    pub fn relevant_keys(&self) -> Vec<String> {
        match self.mode {
            Mode::Single => self
                .selected_disease
                .map(|d| d.fields().iter().map(|f| f.name.to_string()).collect())
                .unwrap_or_default(),
            Mode::Multi => DiseaseId::ALL
                .iter()
                .flat_map(|d| d.fields().iter().map(move |f| multi_key(*d, f.name)))
                .collect(),
        }
    }

    fn is_relevant_key(&self, key: &str) -> bool {
        match self.mode {
            Mode::Single => self
                .selected_disease
                .is_some_and(|d| d.fields().iter().any(|f| f.name == key)),
            Mode::Multi => DiseaseId::ALL.iter().any(|d| {
                key.strip_prefix(d.as_str())
                    .and_then(|rest| rest.strip_prefix('-'))
                    .is_some_and(|feature| d.fields().iter().any(|f| f.name == feature))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_value() {
        assert_eq!(FieldValue::parse("120"), FieldValue::Number(120.0));
        assert_eq!(FieldValue::parse(" 0.627 "), FieldValue::Number(0.627));
        assert_eq!(FieldValue::parse("-1.5"), FieldValue::Number(-1.5));
        assert_eq!(FieldValue::parse(""), FieldValue::Empty);
        assert_eq!(FieldValue::parse("abc"), FieldValue::Empty);
        assert_eq!(FieldValue::parse("NaN"), FieldValue::Empty);
        assert_eq!(FieldValue::parse("inf"), FieldValue::Empty);
    }

    #[test]
    fn test_field_keys() {
        assert_eq!(field_key(Mode::Single, DiseaseId::Diabetes, "Age"), "Age");
        assert_eq!(
            field_key(Mode::Multi, DiseaseId::HeartDisease, "Age"),
            "Heart Disease-Age"
        );
    }

    #[test]
    fn test_single_mode_requires_selected_disease_for_fields() {
        let mut form = FormState::new();
        assert!(form.set_field("Glucose", "120").is_err());

        form.set_selected_disease(Some(DiseaseId::Diabetes)).unwrap();
        form.set_field("Glucose", "120").unwrap();
        assert_eq!(form.value("Glucose"), Some(FieldValue::Number(120.0)));

        // Not a diabetes feature
        assert!(form.set_field("Cholesterol", "200").is_err());
    }

    #[test]
    fn test_invalid_input_stored_as_empty() {
        let mut form = FormState::new();
        form.set_selected_disease(Some(DiseaseId::Diabetes)).unwrap();
        form.set_field("BMI", "not a number").unwrap();
        assert_eq!(form.value("BMI"), Some(FieldValue::Empty));
    }

    #[test]
    fn test_multi_mode_keys() {
        let mut form = FormState::new();
        form.set_mode(Mode::Multi);

        form.set_field("Heart Disease-Sex (0: Female, 1: Male)", "1")
            .unwrap();
        form.set_field("Kidney Disease-DM", "0").unwrap();
        assert!(form.set_field("Age", "40").is_err());
        assert!(form.set_field("Heart Disease-Glucose", "40").is_err());
        assert!(form.set_field("Diabetes-", "40").is_err());
    }

    #[test]
    fn test_selecting_disease_outside_single_mode() {
        let mut form = FormState::new();
        form.set_mode(Mode::Multi);
        assert_eq!(
            form.set_selected_disease(Some(DiseaseId::Diabetes)),
            Err(FormError::NotSingleMode)
        );
    }

    #[test]
    fn test_mode_switch_keeps_values() {
        let mut form = FormState::new();
        form.set_selected_disease(Some(DiseaseId::Diabetes)).unwrap();
        form.set_field("Age", "50").unwrap();

        assert!(form.set_mode(Mode::Multi));
        assert!(!form.set_mode(Mode::Multi));
        assert_eq!(form.value("Age"), Some(FieldValue::Number(50.0)));

        assert!(form.set_mode(Mode::Single));
        assert_eq!(form.selected_disease(), None);
        assert_eq!(form.value("Age"), Some(FieldValue::Number(50.0)));
    }

    #[test]
    fn test_changing_disease_keeps_values() {
        let mut form = FormState::new();
        form.set_selected_disease(Some(DiseaseId::Diabetes)).unwrap();
        form.set_field("Glucose", "140").unwrap();
        form.set_selected_disease(Some(DiseaseId::HeartDisease))
            .unwrap();
        assert_eq!(form.value("Glucose"), Some(FieldValue::Number(140.0)));
    }

    #[test]
    fn test_reset_clears_values_only() {
        let mut form = FormState::new();
        form.set_selected_disease(Some(DiseaseId::LiverDisease))
            .unwrap();
        form.set_field("Age", "33").unwrap();
        form.reset();
        assert!(form.is_empty());
        assert_eq!(form.selected_disease(), Some(DiseaseId::LiverDisease));
    }

    #[test]
    fn test_relevant_keys() {
        let mut form = FormState::new();
        assert!(form.relevant_keys().is_empty());

        form.set_selected_disease(Some(DiseaseId::Diabetes)).unwrap();
        assert_eq!(form.relevant_keys().len(), 8);
        assert_eq!(form.relevant_keys()[0], "Pregnancies");

        form.set_mode(Mode::Multi);
        let keys = form.relevant_keys();
        assert_eq!(keys.len(), 8 + 10 + 10 + 16 + 10);
        assert_eq!(keys[0], "Diabetes-Pregnancies");
        assert_eq!(keys.last().unwrap(), "Liver Disease-LiverFunctionTest");
    }
}
