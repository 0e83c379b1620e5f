use serde::{Deserialize, Deserializer, Serialize};

/// Sex assigned at birth, used to pick sex-partitioned reference ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Case-insensitive parse; anything unrecognized is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "man" => Some(Sex::Male),
            "female" | "f" | "woman" => Some(Sex::Female),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Respondent attributes every ruleset and the classifier may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default, alias = "biological_sex", deserialize_with = "lenient_sex")]
    pub sex: Option<Sex>,
}

impl Demographics {
    pub const ADULT_AGE: u32 = 18;

    pub fn new(age: Option<u32>, sex: Option<Sex>) -> Self {
        Self { age, sex }
    }

    pub fn is_minor(&self) -> bool {
        self.age.is_some_and(|age| age < Self::ADULT_AGE)
    }
}

fn lenient_sex<'de, D>(deserializer: D) -> Result<Option<Sex>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Sex::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_parses_case_insensitively() {
        assert_eq!(Sex::parse(" FEMALE "), Some(Sex::Female));
        assert_eq!(Sex::parse("m"), Some(Sex::Male));
        assert_eq!(Sex::parse("prefer not to say"), None);
    }

    #[test]
    fn demographics_accept_biological_sex_alias() {
        let demographics: Demographics =
            serde_json::from_str(r#"{"age": 44, "biological_sex": "Male"}"#).expect("parses");
        assert_eq!(demographics, Demographics::new(Some(44), Some(Sex::Male)));

        let unknown: Demographics =
            serde_json::from_str(r#"{"sex": "other"}"#).expect("parses unknown sex");
        assert_eq!(unknown.sex, None);
        assert!(!unknown.is_minor());
    }
}
