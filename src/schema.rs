//! Schema registry: which numeric fields each disease model expects.
//!
//! The field order of every table is the positional encoding of the
//! `data` array sent to the scoring service. Reordering, inserting or
//! removing an entry changes the meaning of every request for that disease
//! without changing the request shape, so any edit here has to ship
//! together with the matching model change on the service side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownDisease;

/// Disease models supported by the scoring service.
///
/// Variant order is the registry enumeration order used for multi-disease
/// payloads and as the final ranking tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiseaseId {
    #[serde(rename = "Diabetes")]
    Diabetes,
    #[serde(rename = "Heart Disease")]
    HeartDisease,
    #[serde(rename = "Hypertension")]
    Hypertension,
    #[serde(rename = "Kidney Disease")]
    KidneyDisease,
    #[serde(rename = "Liver Disease")]
    LiverDisease,
}

impl DiseaseId {
    /// All diseases in registry order.
    pub const ALL: [DiseaseId; 5] = [
        DiseaseId::Diabetes,
        DiseaseId::HeartDisease,
        DiseaseId::Hypertension,
        DiseaseId::KidneyDisease,
        DiseaseId::LiverDisease,
    ];

    /// Wire name, also shown to the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseId::Diabetes => "Diabetes",
            DiseaseId::HeartDisease => "Heart Disease",
            DiseaseId::Hypertension => "Hypertension",
            DiseaseId::KidneyDisease => "Kidney Disease",
            DiseaseId::LiverDisease => "Liver Disease",
        }
    }

    /// Ordered field list for this disease.
    pub fn fields(&self) -> &'static [FeatureSpec] {
        fields_for(*self)
    }
}

impl fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiseaseId {
    type Err = UnknownDisease;

    /// Accepts the wire name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DiseaseId::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDisease(s.to_string()))
    }
}

/// Kind of value a field holds. Every model input is numeric today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Numeric,
}

/// One named model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl FeatureSpec {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: ValueKind::Numeric,
        }
    }
}

const DIABETES: &[FeatureSpec] = &[
    FeatureSpec::numeric("Pregnancies"),
    FeatureSpec::numeric("Glucose"),
    FeatureSpec::numeric("BloodPressure"),
    FeatureSpec::numeric("SkinThickness"),
    FeatureSpec::numeric("Insulin"),
    FeatureSpec::numeric("BMI"),
    FeatureSpec::numeric("DiabetesPedigreeFunction"),
    FeatureSpec::numeric("Age"),
];

const HEART_DISEASE: &[FeatureSpec] = &[
    FeatureSpec::numeric("Age"),
    FeatureSpec::numeric("Sex (0: Female, 1: Male)"),
    FeatureSpec::numeric("RestingBP"),
    FeatureSpec::numeric("Cholesterol"),
    FeatureSpec::numeric("FastingBS"),
    FeatureSpec::numeric("RestingECG"),
    FeatureSpec::numeric("MaxHR"),
    FeatureSpec::numeric("ExerciseAngina"),
    FeatureSpec::numeric("Oldpeak"),
    FeatureSpec::numeric("ST_Slope"),
];

const HYPERTENSION: &[FeatureSpec] = &[
    FeatureSpec::numeric("Age"),
    FeatureSpec::numeric("Salt_Intake"),
    FeatureSpec::numeric("Stress_Score"),
    FeatureSpec::numeric("BP_History"),
    FeatureSpec::numeric("Sleep_Duration"),
    FeatureSpec::numeric("BMI"),
    FeatureSpec::numeric("Medication"),
    FeatureSpec::numeric("Family_History"),
    FeatureSpec::numeric("Exercise_Level"),
    FeatureSpec::numeric("Smoking_Status"),
];

const KIDNEY_DISEASE: &[FeatureSpec] = &[
    FeatureSpec::numeric("Age"),
    FeatureSpec::numeric("BP"),
    FeatureSpec::numeric("SG"),
    FeatureSpec::numeric("AL"),
    FeatureSpec::numeric("SU"),
    FeatureSpec::numeric("BGR"),
    FeatureSpec::numeric("BU"),
    FeatureSpec::numeric("SC"),
    FeatureSpec::numeric("SOD"),
    FeatureSpec::numeric("POT"),
    FeatureSpec::numeric("HEMO"),
    FeatureSpec::numeric("PCV"),
    FeatureSpec::numeric("WC"),
    FeatureSpec::numeric("RC"),
    FeatureSpec::numeric("HTN"),
    FeatureSpec::numeric("DM"),
];

const LIVER_DISEASE: &[FeatureSpec] = &[
    FeatureSpec::numeric("Age"),
    FeatureSpec::numeric("Gender"),
    FeatureSpec::numeric("BMI"),
    FeatureSpec::numeric("AlcoholConsumption"),
    FeatureSpec::numeric("Smoking"),
    FeatureSpec::numeric("GeneticRisk"),
    FeatureSpec::numeric("PhysicalActivity"),
    FeatureSpec::numeric("Diabetes"),
    FeatureSpec::numeric("Hypertension"),
    FeatureSpec::numeric("LiverFunctionTest"),
];

/// Ordered field list for a disease.
pub fn fields_for(disease: DiseaseId) -> &'static [FeatureSpec] {
    match disease {
        DiseaseId::Diabetes => DIABETES,
        DiseaseId::HeartDisease => HEART_DISEASE,
        DiseaseId::Hypertension => HYPERTENSION,
        DiseaseId::KidneyDisease => KIDNEY_DISEASE,
        DiseaseId::LiverDisease => LIVER_DISEASE,
    }
}
