use serde::{Deserialize, Serialize};
use thiserror::Error;
use udq_core::{DEFAULT_CMP_EPSILON, UdqError, ensure_finite};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] UdqError),
}

/// Engine-wide parameters, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdqParams {
    /// Relative epsilon of EQ, NE, LE and GE.
    pub cmp_epsilon: f64,
    /// Value written for undefined results when exporting flat tables.
    pub undefined_value: f64,
    /// Seed for the host's random generator.
    pub random_seed: u64,
    /// Reseed the generator at every report step.
    pub reseed: bool,
}

impl Default for UdqParams {
    fn default() -> Self {
        Self {
            cmp_epsilon: DEFAULT_CMP_EPSILON,
            undefined_value: 0.0,
            random_seed: 1,
            reseed: false,
        }
    }
}

impl UdqParams {
    pub fn validate(&self) -> Result<(), UdqError> {
        let eps = ensure_finite(self.cmp_epsilon, "cmp_epsilon")?;
        if eps < 0.0 {
            return Err(UdqError::InvalidArg {
                what: "cmp_epsilon must be non-negative",
            });
        }
        ensure_finite(self.undefined_value, "undefined_value")?;
        Ok(())
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        let params: Self = serde_yaml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let params: Self = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Seed for the generator at `report_step`.
    pub fn seed_for_step(&self, report_step: usize) -> u64 {
        if self.reseed {
            self.random_seed.wrapping_add(report_step as u64)
        } else {
            self.random_seed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = UdqParams::default();
        assert_eq!(p.cmp_epsilon, 1e-4);
        assert_eq!(p.undefined_value, 0.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn yaml_fills_missing_fields() {
        let p = UdqParams::from_yaml_str("cmp_epsilon: 0.2\n").unwrap();
        assert_eq!(p.cmp_epsilon, 0.2);
        assert_eq!(p.random_seed, 1);
    }

    #[test]
    fn json_rejects_negative_epsilon() {
        let err = UdqParams::from_json_str(r#"{"cmp_epsilon": -1.0}"#).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn reseed_varies_by_step() {
        let p = UdqParams {
            reseed: true,
            ..UdqParams::default()
        };
        assert_ne!(p.seed_for_step(1), p.seed_for_step(2));
        assert_eq!(UdqParams::default().seed_for_step(9), 1);
    }
}
