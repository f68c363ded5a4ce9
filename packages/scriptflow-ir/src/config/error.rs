//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid range for field '{field}': {value} not in {min}..={max}. {hint}")]
    Range {
        field: String,
        value: String,
        min: String,
        max: String,
        hint: String,
    },

    #[error("Unknown field '{field}' in stage '{stage}'. {suggestion}")]
    UnknownField {
        field: String,
        stage: String,
        suggestion: String,
        valid_fields: Vec<String>,
    },

    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    #[error("Unsupported configuration version {found}. Supported versions: {}", supported.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    #[error("Unknown preset '{0}'. Valid presets: fast, balanced, thorough, custom")]
    UnknownPreset(String),

    /// Override for a disabled stage (strict mode only)
    #[error("Stage '{stage}' is disabled but has configuration overrides. {hint}")]
    DisabledStageOverride { stage: String, hint: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Custom(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn range_with_hint(
        field: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
        hint: impl Into<String>,
    ) -> Self {
        Self::Range {
            field: field.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            hint: hint.into(),
        }
    }

    pub fn unknown_field_with_suggestion(
        field: impl Into<String>,
        stage: impl Into<String>,
        valid_fields: Vec<String>,
    ) -> Self {
        let field = field.into();
        let suggestion = find_closest_match(&field, &valid_fields);

        Self::UnknownField {
            field,
            stage: stage.into(),
            suggestion,
            valid_fields,
        }
    }
}

fn find_closest_match(target: &str, candidates: &[String]) -> String {
    candidates
        .iter()
        .min_by_key(|candidate| levenshtein_distance(target, candidate))
        .map(|closest| format!("Did you mean '{}'?", closest))
        .unwrap_or_else(|| "No valid fields available".to_string())
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s2: Vec<char> = s2.chars().collect();
    let mut previous: Vec<usize> = (0..=s2.len()).collect();

    for (i, c1) in s1.chars().enumerate() {
        let mut current = vec![i + 1; s2.len() + 1];
        for (j, c2) in s2.iter().enumerate() {
            let cost = usize::from(c1 != *c2);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[s2.len()]
}
