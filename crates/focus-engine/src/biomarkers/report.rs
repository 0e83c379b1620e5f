use crate::demographics::Sex;
use crate::lexical::pattern::Pattern;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::sync::OnceLock;
use thiserror::Error;

static NUMBER: Pattern = Pattern::new(r"[-+]?\d*\.?\d+");

/// Keys a lab export carries next to the readings.
const METADATA_FIELDS: &[&str] = &["Kit Type", "Total Biomarkers", "Order ID", "Test Date", "Gender"];

const LAB_ALIASES: &[(&str, &str)] = &[
    ("% Hemoglobin A1C", "HbA1c"),
    ("Hemoglobin A1C", "HbA1c"),
    ("C-Peptide", "C-peptide"),
    ("Testosterone, Free (calc)", "Free Testosterone"),
    ("% Free Testosterone", "Free Testosterone"),
    ("Triglycerides:HDL Ratio", "Triglyceride:HDL Ratio"),
    ("Total Cholesterol", "Calculated Total Cholesterol"),
    ("Calculated Cholesterol, Total", "Calculated Total Cholesterol"),
    ("Thyroid Stimulating Hormone (TSH)", "TSH"),
    (
        "Unsaturated iron-binding capacity test (UIBC)",
        "Unsaturated Iron Binding Capacity (UIBC)",
    ),
    ("Sex Hormone-Binding Globulin (SHBG)", "SBHG"),
    ("SHBG", "SBHG"),
    ("Alanine Aminotransferase (ALT)", "Alanine Aminotransferase"),
    ("Aspartate Aminotransferase (AST)", "Aspartate Aminotransferase"),
    ("Lipoprotein (a)", "Lp(a)"),
    ("Blood Urea Nitrogen (BUN)", "Blood Urea Nitrogen"),
    ("Total Bilirubin", "Bilirubin"),
    ("Direct Bilirubin", "Bilirubin"),
    ("Estim. Avg Glu (eAG)", "EAG (Calc.)"),
    ("LDL-C:HDL-C Ratio", "LDL:HDL Ratio (Calc.)"),
    ("VLDL Cholesterol (Calc)", "VLDL (Calculated)"),
    ("Glucose", "Fasting Glucose"),
    ("Insulin", "Fasting Insulin"),
    ("hs-CRP", "High-Sensitivity CRP"),
    ("Vitamin D, 25-Hydroxy", "25-(OH) Vitamin D"),
];

static ALIAS_INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Canonical table name for a lab display name; unknown names pass through trimmed.
pub fn canonical_name(name: &str) -> String {
    let trimmed = name.trim();
    ALIAS_INDEX
        .get_or_init(|| LAB_ALIASES.iter().copied().collect())
        .get(trimmed)
        .map_or_else(|| trimmed.to_string(), |canonical| (*canonical).to_string())
}

/// First numeric token of a reading such as `"190.98 mg/dL"`.
pub fn extract_numeric(raw: &str) -> Option<f64> {
    NUMBER
        .regex()?
        .find(raw)
        .and_then(|found| found.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[derive(Debug, Error)]
pub enum BloodReportError {
    #[error("blood report must be an object mapping biomarker names to values, got {0}")]
    NotAnObject(&'static str),
    #[error("blood report json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("blood report csv is malformed: {0}")]
    Csv(#[from] csv::Error),
}

/// One reading as supplied, before numeric extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub source_name: String,
    pub name: String,
    pub raw_value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BloodReport {
    readings: Vec<Reading>,
    declared_sex: Option<Sex>,
}

impl BloodReport {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut report = Self::default();
        for (name, value) in pairs {
            report.push(name.as_ref(), value.into());
        }
        report
    }

    pub fn from_json_value(value: &Value) -> Result<Self, BloodReportError> {
        let Value::Object(map) = value else {
            return Err(BloodReportError::NotAnObject(json_kind(value)));
        };

        let mut report = Self::default();
        for (name, value) in map {
            let raw = match value {
                Value::Null => continue,
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                other => other.to_string(),
            };
            report.push(name, raw);
        }
        Ok(report)
    }

    pub fn from_json_str(input: &str) -> Result<Self, BloodReportError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json_value(&value)
    }

    /// Two-column export with a `Biomarker` (or `Name`) and a `Value` (or `Result`)
    /// header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, BloodReportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut report = Self::default();
        for row in csv_reader.deserialize::<ReportRow>() {
            let row = row?;
            if let Some(value) = row.value {
                report.push(&row.name, value);
            }
        }
        Ok(report)
    }

    fn push(&mut self, source_name: &str, raw_value: String) {
        let source_name = source_name.trim();
        if source_name == "Gender" {
            self.declared_sex = Sex::parse(&raw_value);
        }
        if METADATA_FIELDS.contains(&source_name) || raw_value.trim().is_empty() {
            return;
        }
        self.readings.push(Reading {
            source_name: source_name.to_string(),
            name: canonical_name(source_name),
            raw_value,
        });
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Sex carried by the report's `Gender` field, used when demographics omit it.
    pub fn declared_sex(&self) -> Option<Sex> {
        self.declared_sex
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "Biomarker", alias = "Name", alias = "biomarker", alias = "name")]
    name: String,
    #[serde(
        rename = "Value",
        alias = "Result",
        alias = "value",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    value: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
