//! The twelve clinical voice features and their static descriptor table.
//!
//! Every part of the pipeline that needs a key, a display label, a grouping,
//! or a numeric bound reads it from the single [`FEATURES`] table, so the
//! constraint table, the labels, and the wire names cannot drift apart.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the twelve fixed feature identifiers.
///
/// Variants are declared in display order; `as usize` indexes into
/// [`FEATURES`]. Serialization uses the exact wire names the prediction
/// service expects (`age`, `Jitter(%)`, `Shimmer:APQ5`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureKey {
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "sex")]
    Sex,
    #[serde(rename = "test_time")]
    TestTime,
    #[serde(rename = "Jitter(%)")]
    JitterPercent,
    #[serde(rename = "Jitter:PPQ5")]
    JitterPpq5,
    #[serde(rename = "Shimmer(dB)")]
    ShimmerDb,
    #[serde(rename = "Shimmer:APQ5")]
    ShimmerApq5,
    #[serde(rename = "NHR")]
    Nhr,
    #[serde(rename = "HNR")]
    Hnr,
    #[serde(rename = "RPDE")]
    Rpde,
    #[serde(rename = "DFA")]
    Dfa,
    #[serde(rename = "PPE")]
    Ppe,
}

impl FeatureKey {
    /// All twelve keys in fixed display order.
    pub const ALL: [FeatureKey; 12] = [
        FeatureKey::Age,
        FeatureKey::Sex,
        FeatureKey::TestTime,
        FeatureKey::JitterPercent,
        FeatureKey::JitterPpq5,
        FeatureKey::ShimmerDb,
        FeatureKey::ShimmerApq5,
        FeatureKey::Nhr,
        FeatureKey::Hnr,
        FeatureKey::Rpde,
        FeatureKey::Dfa,
        FeatureKey::Ppe,
    ];

    /// The static descriptor for this key.
    pub fn spec(self) -> &'static FeatureSpec {
        &FEATURES[self as usize]
    }

    /// The technical name used on the wire and in stored records.
    pub fn wire_name(self) -> &'static str {
        self.spec().wire_name
    }

    /// The human-friendly label shown to users and in error messages.
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    /// Look a key up by its wire name (e.g. `"Jitter(%)"`).
    pub fn from_wire_name(name: &str) -> Option<FeatureKey> {
        FeatureKey::ALL
            .into_iter()
            .find(|k| k.wire_name() == name)
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for FeatureKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureKey::from_wire_name(s).ok_or_else(|| format!("unknown feature key: {s}"))
    }
}

/// Static descriptor for one feature: wire name, label, grouping, bounds.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub key: FeatureKey,
    pub wire_name: &'static str,
    /// Human-friendly label, also used verbatim in validation messages.
    pub label: &'static str,
    /// Measurement category, used by the feature reference output.
    pub group: &'static str,
    /// Inclusive lower bound, if any.
    pub min: Option<f64>,
    /// Inclusive upper bound, if any.
    pub max: Option<f64>,
}

/// The single source of truth for keys, labels, groups, and bounds.
///
/// Order matches `FeatureKey::ALL` and the enum discriminants.
pub const FEATURES: [FeatureSpec; 12] = [
    FeatureSpec {
        key: FeatureKey::Age,
        wire_name: "age",
        label: "Age",
        group: "Demographics",
        min: Some(0.0),
        max: Some(120.0),
    },
    FeatureSpec {
        key: FeatureKey::Sex,
        wire_name: "sex",
        label: "Sex (0 = Female, 1 = Male)",
        group: "Demographics",
        min: Some(0.0),
        max: Some(1.0),
    },
    FeatureSpec {
        key: FeatureKey::TestTime,
        wire_name: "test_time",
        label: "Test Time (Sec)",
        group: "Timing",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::JitterPercent,
        wire_name: "Jitter(%)",
        label: "Pitch Wobbliness",
        group: "Pitch Stability (Jitter)",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::JitterPpq5,
        wire_name: "Jitter:PPQ5",
        label: "Refined Pitch Wobbliness",
        group: "Pitch Stability (Jitter)",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::ShimmerDb,
        wire_name: "Shimmer(dB)",
        label: "Loudness Unsteadiness",
        group: "Loudness (Shimmer)",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::ShimmerApq5,
        wire_name: "Shimmer:APQ5",
        label: "Refined Loudness Unsteadiness",
        group: "Loudness (Shimmer)",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::Nhr,
        wire_name: "NHR",
        label: "Noisiness Score",
        group: "Signal Quality",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::Hnr,
        wire_name: "HNR",
        label: "Clarity Score",
        group: "Signal Quality",
        min: Some(0.0),
        max: None,
    },
    FeatureSpec {
        key: FeatureKey::Rpde,
        wire_name: "RPDE",
        label: "Signal Randomness",
        group: "Complexity",
        min: Some(0.0),
        max: Some(1.0),
    },
    FeatureSpec {
        key: FeatureKey::Dfa,
        wire_name: "DFA",
        label: "Pitch Pattern Consistency",
        group: "Complexity",
        min: Some(0.0),
        max: Some(1.0),
    },
    FeatureSpec {
        key: FeatureKey::Ppe,
        wire_name: "PPE",
        label: "Pitch Period Disorder",
        group: "Complexity",
        min: Some(0.0),
        max: None,
    },
];

/// The measurement groups in display order, as shown by the feature reference.
pub const FEATURE_GROUPS: [&str; 6] = [
    "Demographics",
    "Timing",
    "Pitch Stability (Jitter)",
    "Loudness (Shimmer)",
    "Signal Quality",
    "Complexity",
];

/// Raw user input: one free-text string per feature key.
///
/// Entries are mutated one at a time as the user edits; validation converts
/// the whole form into a [`FeatureRecord`] or a set of field errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureForm {
    entries: BTreeMap<FeatureKey, String>,
}

impl FeatureForm {
    /// A form with all twelve entries present but empty.
    pub fn empty() -> Self {
        Self {
            entries: FeatureKey::ALL
                .into_iter()
                .map(|k| (k, String::new()))
                .collect(),
        }
    }

    /// The bundled sample record, useful as a starting point.
    pub fn sample() -> Self {
        let mut form = Self::empty();
        for (key, value) in SAMPLE_VALUES {
            form.set(key, value);
        }
        form
    }

    /// Replace the entry for one key.
    pub fn set(&mut self, key: FeatureKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    /// The current raw text for one key.
    pub fn get(&self, key: FeatureKey) -> &str {
        self.entries.get(&key).map(String::as_str).unwrap_or("")
    }
}

impl Default for FeatureForm {
    fn default() -> Self {
        Self::empty()
    }
}

/// Default sample values for every feature, in display order.
const SAMPLE_VALUES: [(FeatureKey, &str); 12] = [
    (FeatureKey::Age, "59"),
    (FeatureKey::Sex, "0"),
    (FeatureKey::TestTime, "12.66"),
    (FeatureKey::JitterPercent, "0.007"),
    (FeatureKey::JitterPpq5, "0.004"),
    (FeatureKey::ShimmerDb, "0.25"),
    (FeatureKey::ShimmerApq5, "0.02"),
    (FeatureKey::Nhr, "0.02"),
    (FeatureKey::Hnr, "21"),
    (FeatureKey::Rpde, "0.45"),
    (FeatureKey::Dfa, "0.55"),
    (FeatureKey::Ppe, "0.1"),
];

/// A validated, complete feature vector.
///
/// Only the validator constructs one, so every instance carries all twelve
/// keys with finite, in-range values. Serializes to the prediction service's
/// wire format: a JSON object mapping wire names to numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: [f64; 12],
}

impl FeatureRecord {
    pub(crate) fn from_values(values: [f64; 12]) -> Self {
        Self { values }
    }

    /// The validated value for one key.
    pub fn get(&self, key: FeatureKey) -> f64 {
        self.values[key as usize]
    }

    /// Iterate over all twelve `(key, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        FeatureKey::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for FeatureRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<FeatureKey, f64>::deserialize(deserializer)?;
        let mut values = [0.0; 12];
        for key in FeatureKey::ALL {
            match map.get(&key) {
                Some(v) => values[key as usize] = *v,
                None => {
                    return Err(de::Error::custom(format!(
                        "missing feature: {}",
                        key.wire_name()
                    )))
                }
            }
        }
        Ok(Self { values })
    }
}

/// The two severity scores returned by the prediction service.
///
/// Both are opaque to this crate; no range is imposed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "motor_UPDRS")]
    pub motor_updrs: f64,
    #[serde(rename = "total_UPDRS")]
    pub total_updrs: f64,
}
