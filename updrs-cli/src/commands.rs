//! Subcommand handlers: submit, history, features, config.

use anyhow::{bail, Context};
use std::sync::Arc;
use updrs_core::{
    AppConfig, FeatureForm, FeatureKey, FeatureSpec, HttpPredictor, JsonlRecordStore,
    StaticIdentity, SubmitError, SubmissionRecord, Submitter, FEATURES, FEATURE_GROUPS,
};
use updrs_core::config::{starter_config_toml, user_config_path};
use updrs_core::RecordStore;

/// Parse one `--set KEY=VALUE` argument. The key is a wire name, so
/// `--set "Jitter(%)=0.007"` works.
fn parse_set(entry: &str) -> anyhow::Result<(FeatureKey, String)> {
    let (name, value) = entry
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got: {entry}"))?;
    let key = FeatureKey::from_wire_name(name.trim()).with_context(|| {
        let known = FeatureKey::ALL
            .map(|k| k.wire_name())
            .join(", ");
        format!("unknown feature key: {name} (known keys: {known})")
    })?;
    Ok((key, value.to_string()))
}

/// Human-readable accepted range for one feature.
fn range_text(spec: &FeatureSpec) -> String {
    match (spec.min, spec.max) {
        (Some(min), Some(max)) => format!("{min} to {max}"),
        (Some(min), None) => format!("at least {min}"),
        (None, Some(max)) => format!("at most {max}"),
        (None, None) => "any number".to_string(),
    }
}

pub async fn submit(
    config: &AppConfig,
    sample: bool,
    set: &[String],
    predictor_url: Option<String>,
    anonymous: bool,
) -> anyhow::Result<()> {
    let mut form = if sample {
        FeatureForm::sample()
    } else {
        FeatureForm::empty()
    };
    for entry in set {
        let (key, value) = parse_set(entry)?;
        form.set(key, value);
    }

    let base_url = predictor_url.unwrap_or_else(|| config.predictor.base_url.clone());
    let identity = if anonymous {
        StaticIdentity::anonymous()
    } else {
        StaticIdentity::new(config.identity.user_id.clone())
    };
    let submitter = Submitter::new(
        Arc::new(HttpPredictor::new(base_url)),
        Arc::new(JsonlRecordStore::new(config.history.resolved_path())),
        Arc::new(identity),
    );

    match submitter.submit(&form).await {
        Ok(outcome) => {
            println!("Predicted Motor UPDRS: {:.3}", outcome.prediction.motor_updrs);
            println!("Predicted Total UPDRS: {:.3}", outcome.prediction.total_updrs);
            if let Some(record) = &outcome.record {
                println!("Saved to history ({})", record.id);
            }
            if let Some(e) = &outcome.history_error {
                // Soft failure: the prediction above still stands.
                eprintln!("Warning: could not save this submission to history: {e}");
            }
            Ok(())
        }
        Err(SubmitError::Validation(errors)) => {
            eprintln!("Input error:");
            for (_, message) in errors.iter() {
                eprintln!("  - {message}");
            }
            bail!("form validation failed ({} field(s))", errors.len());
        }
        Err(SubmitError::Prediction(e)) => {
            bail!("{e}. Ensure the prediction gateway is running.");
        }
    }
}

pub async fn history(config: &AppConfig, limit: Option<usize>) -> anyhow::Result<()> {
    let store = JsonlRecordStore::new(config.history.resolved_path());
    let records = store
        .for_user(config.identity.user_id.as_deref())
        .await
        .context("could not load submission history")?;

    if records.is_empty() {
        println!("No submissions recorded yet.");
        return Ok(());
    }

    let shown = limit.unwrap_or(records.len());
    for record in records.iter().take(shown) {
        print_record(record);
    }
    if shown < records.len() {
        println!("... and {} older record(s)", records.len() - shown);
    }
    Ok(())
}

fn print_record(record: &SubmissionRecord) {
    let local = record.created_at.with_timezone(&chrono::Local);
    println!("{} ({})", local.format("%Y-%m-%d %H:%M"), record.id);
    println!(
        "  Motor UPDRS: {:.3}   Total UPDRS: {:.3}",
        record.motor_updrs, record.total_updrs
    );
    let fields: Vec<String> = record
        .features
        .iter()
        .map(|(key, value)| format!("{}={}", key.wire_name(), value))
        .collect();
    println!("  {}", fields.join("  "));
}

pub fn features() -> anyhow::Result<()> {
    println!("Required measurements (all 12 must be entered):\n");
    for group in FEATURE_GROUPS {
        println!("{}", group.to_uppercase());
        for spec in FEATURES.iter().filter(|s| s.group == group) {
            println!("  {} [{}]: {}", spec.label, spec.wire_name, range_text(spec));
        }
        println!();
    }
    println!("Motor UPDRS: focuses on physical movement abilities.");
    println!("Total UPDRS: combined clinical assessment score.");
    Ok(())
}

pub fn config_show(config: &AppConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn config_init() -> anyhow::Result<()> {
    let path = user_config_path().context("could not determine the user config directory")?;
    if path.exists() {
        bail!("config file already exists at {}", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, starter_config_toml())?;
    println!("Wrote starter config to {}", path.display());
    Ok(())
}
