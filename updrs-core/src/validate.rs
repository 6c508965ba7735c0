//! Form validation: raw strings in, a complete numeric record or a full set
//! of field errors out.
//!
//! Validation is a pure function of the form and the static [`FEATURES`]
//! table. It never short-circuits: every failing field is reported in one
//! pass, so the user can fix the whole form at once.

use crate::features::{FeatureForm, FeatureKey, FeatureRecord, FEATURES};
use std::collections::BTreeMap;
use std::fmt;

/// Per-field validation messages plus an optional general error slot.
///
/// Transient: recomputed on every validation attempt. Iteration order is
/// the fixed feature display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<FeatureKey, String>,
    general: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    /// Number of failing fields (the general slot not included).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// The message for one field, if it failed.
    pub fn get(&self, key: FeatureKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    /// The general (non-field) error, if any.
    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn insert(&mut self, key: FeatureKey, message: impl Into<String>) {
        self.fields.insert(key, message.into());
    }

    pub fn set_general(&mut self, message: impl Into<String>) {
        self.general = Some(message.into());
    }

    /// Iterate over `(key, message)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, &str)> + '_ {
        self.fields.iter().map(|(k, m)| (*k, m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        if let Some(general) = &self.general {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(general)?;
        }
        Ok(())
    }
}

/// Validate a complete form against the static feature table.
///
/// Each field is trimmed, then checked in order: present, numeric and
/// finite, within its inclusive bounds. On the first failing check for a
/// field the walk moves on to the next field, so the returned error set
/// holds exactly one message per failing field and nothing for the rest.
pub fn validate(form: &FeatureForm) -> Result<FeatureRecord, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut values = [0.0; 12];

    for spec in &FEATURES {
        let raw = form.get(spec.key).trim();

        if raw.is_empty() {
            errors.insert(spec.key, format!("{} is required", spec.label));
            continue;
        }

        // f64 parsing accepts "NaN" and "inf" spellings; those are not
        // usable measurements, so they fail the same way garbage does.
        let value = match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                errors.insert(spec.key, format!("{} must be a number", spec.label));
                continue;
            }
        };

        if let Some(min) = spec.min {
            if value < min {
                errors.insert(spec.key, format!("{} must be ≥ {}", spec.label, min));
                continue;
            }
        }
        if let Some(max) = spec.max {
            if value > max {
                errors.insert(spec.key, format!("{} must be ≤ {}", spec.label, max));
                continue;
            }
        }

        values[spec.key as usize] = value;
    }

    if errors.is_empty() {
        Ok(FeatureRecord::from_values(values))
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sample_form_validates_cleanly() {
        let record = validate(&FeatureForm::sample()).unwrap();
        assert_eq!(record.get(FeatureKey::Age), 59.0);
        assert_eq!(record.get(FeatureKey::Sex), 0.0);
        assert_eq!(record.get(FeatureKey::TestTime), 12.66);
        assert_eq!(record.get(FeatureKey::JitterPercent), 0.007);
        assert_eq!(record.get(FeatureKey::JitterPpq5), 0.004);
        assert_eq!(record.get(FeatureKey::ShimmerDb), 0.25);
        assert_eq!(record.get(FeatureKey::ShimmerApq5), 0.02);
        assert_eq!(record.get(FeatureKey::Nhr), 0.02);
        assert_eq!(record.get(FeatureKey::Hnr), 21.0);
        assert_eq!(record.get(FeatureKey::Rpde), 0.45);
        assert_eq!(record.get(FeatureKey::Dfa), 0.55);
        assert_eq!(record.get(FeatureKey::Ppe), 0.1);
    }

    #[test]
    fn test_each_empty_field_is_required() {
        for key in FeatureKey::ALL {
            let mut form = FeatureForm::sample();
            form.set(key, "");
            let errors = validate(&form).unwrap_err();
            assert_eq!(errors.len(), 1, "only {} should fail", key);
            assert_eq!(
                errors.get(key),
                Some(format!("{} is required", key.label()).as_str())
            );
        }
    }

    #[test]
    fn test_each_non_numeric_field_rejected() {
        for key in FeatureKey::ALL {
            let mut form = FeatureForm::sample();
            form.set(key, "abc");
            let errors = validate(&form).unwrap_err();
            assert_eq!(
                errors.get(key),
                Some(format!("{} must be a number", key.label()).as_str())
            );
        }
    }

    #[test]
    fn test_below_minimum_rejected_exact_minimum_accepted() {
        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Age, "-1");
        let errors = validate(&form).unwrap_err();
        assert_eq!(errors.get(FeatureKey::Age), Some("Age must be ≥ 0"));

        form.set(FeatureKey::Age, "0");
        let record = validate(&form).unwrap();
        assert_eq!(record.get(FeatureKey::Age), 0.0);
    }

    #[test]
    fn test_above_maximum_rejected_exact_maximum_accepted() {
        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Rpde, "1.01");
        let errors = validate(&form).unwrap_err();
        assert_eq!(
            errors.get(FeatureKey::Rpde),
            Some("Signal Randomness must be ≤ 1")
        );

        form.set(FeatureKey::Rpde, "1");
        let record = validate(&form).unwrap();
        assert_eq!(record.get(FeatureKey::Rpde), 1.0);
    }

    #[test]
    fn test_age_above_maximum_message() {
        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Age, "150");
        let errors = validate(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(FeatureKey::Age), Some("Age must be ≤ 120"));
    }

    #[test]
    fn test_multiple_failures_all_reported() {
        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Age, "");
        form.set(FeatureKey::Hnr, "abc");
        form.set(FeatureKey::Dfa, "2");
        let errors = validate(&form).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(FeatureKey::Age), Some("Age is required"));
        assert_eq!(
            errors.get(FeatureKey::Hnr),
            Some("Clarity Score must be a number")
        );
        assert_eq!(
            errors.get(FeatureKey::Dfa),
            Some("Pitch Pattern Consistency must be ≤ 1")
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Age, " 59 ");
        let record = validate(&form).unwrap();
        assert_eq!(record.get(FeatureKey::Age), 59.0);

        form.set(FeatureKey::Age, "   ");
        let errors = validate(&form).unwrap_err();
        assert_eq!(errors.get(FeatureKey::Age), Some("Age is required"));
    }

    #[test]
    fn test_nan_and_infinity_are_not_numbers() {
        for spelling in ["NaN", "inf", "-inf", "infinity"] {
            let mut form = FeatureForm::sample();
            form.set(FeatureKey::Hnr, spelling);
            let errors = validate(&form).unwrap_err();
            assert_eq!(
                errors.get(FeatureKey::Hnr),
                Some("Clarity Score must be a number"),
                "spelling {spelling:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_field_errors_display_joins_in_order() {
        let mut form = FeatureForm::sample();
        form.set(FeatureKey::Age, "");
        form.set(FeatureKey::Ppe, "-1");
        let errors = validate(&form).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "Age is required; Pitch Period Disorder must be ≥ 0"
        );
    }

    #[test]
    fn test_general_error_slot() {
        let mut errors = FieldErrors::default();
        assert!(errors.is_empty());
        errors.set_general("could not save to history");
        assert!(!errors.is_empty());
        assert_eq!(errors.general(), Some("could not save to history"));
        assert_eq!(errors.len(), 0);
    }
}
