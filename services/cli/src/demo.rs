/// A complete intake used by `focus-engine demo`.
pub const SAMPLE_INTAKE: &str = r#"{
    "demographics": {"age": 42, "sex": "female"},
    "referenceDate": "2024-06-15",
    "context": {
        "job_title": "ICU nurse, rotating nights",
        "work_stress_level": 8,
        "top_goals": "lose weight, reduce stress, improve energy",
        "sleep_hours": 5.5,
        "bright_light_at_night": true
    },
    "answers": {
        "TopHealthGoals": "lose weight, reduce stress, improve energy",
        "PatientReasoning": "Work stress and mold in my apartment",
        "TriggerEvent": "Food poisoning in Mexico two years ago",
        "LastFeltWell": "About 3 years ago, before covid",
        "SymptomAggravators": "Dairy and big meals",
        "FoodCravings": ["Sweets", "Salty foods", "Daily"],
        "PartOfDay": "Evening; after a big dinner",
        "WhereSymptomsWorse": "Other; restaurants and travel",
        "SunlightExposure": "Sat, Sun, Fri, Thu, Wed, Tue, Mon",
        "LifestyleWillingness": "Yes, but evenings are hard",
        "CurrentStress": 8
    },
    "bloodReport": {
        "HbA1c": "5.9 %",
        "Fasting Glucose": "97",
        "HDL Cholesterol": "44 mg/dL",
        "Triglycerides": "168",
        "High-Sensitivity CRP": "2.4",
        "TSH": "2.1",
        "Ferritin": "38"
    }
}"#;
