//! Tuning tables with YAML loading and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs with `deny_unknown_fields`
//! - Range validation via `validator`
//! - Semantic validation for cross-field constraints
//!
//! Every field defaults to the value the panel was calibrated with, so an
//! empty document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::engine::jidoka::JidokaConfig;
use crate::error::{PanelError, PanelResult};

/// Top-level panel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    pub schema_version: String,

    /// Governor PID gains and mode limits.
    #[validate(nested)]
    pub governor: GovernorConfig,

    /// Pump and engine thermal rates.
    #[validate(nested)]
    pub thermal: ThermalConfig,

    /// Overpressure, burst and cavitation thresholds.
    #[validate(nested)]
    pub failure: FailureConfig,

    /// Jidoka (stop-on-defect) configuration.
    pub jidoka: JidokaConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            governor: GovernorConfig::default(),
            thermal: ThermalConfig::default(),
            failure: FailureConfig::default(),
            jidoka: JidokaConfig::default(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> PanelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PanelResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Run range and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn check(&self) -> PanelResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> PanelConfigBuilder {
        PanelConfigBuilder::default()
    }

    fn validate_semantic(&self) -> PanelResult<()> {
        let g = &self.governor;
        for (name, value) in [
            ("governor.kp", g.kp),
            ("governor.ki", g.ki),
            ("governor.kd", g.kd),
            ("governor.integral_limit", g.integral_limit),
        ] {
            if !value.is_finite() {
                return Err(PanelError::config(format!("{name} must be finite")));
            }
        }

        if g.min_rpm >= g.max_rpm {
            return Err(PanelError::config(format!(
                "governor.min_rpm ({}) must be below governor.max_rpm ({})",
                g.min_rpm, g.max_rpm
            )));
        }

        if g.hysteresis_psi >= g.pressure_mode_max_psi {
            return Err(PanelError::config(
                "governor.hysteresis_psi must be smaller than governor.pressure_mode_max_psi",
            ));
        }

        if self.failure.pdp_ceiling_psi < self.failure.burst_threshold_psi {
            return Err(PanelError::config(
                "failure.pdp_ceiling_psi must not be below failure.burst_threshold_psi",
            ));
        }

        Ok(())
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct PanelConfigBuilder {
    gains: Option<(f64, f64, f64)>,
    auto_switch: Option<bool>,
    burst_delay_secs: Option<f64>,
    jidoka: Option<JidokaConfig>,
}

impl PanelConfigBuilder {
    /// Set PID gains.
    #[must_use]
    pub const fn gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.gains = Some((kp, ki, kd));
        self
    }

    /// Enable or disable governor auto-switching.
    #[must_use]
    pub const fn auto_switch(mut self, enabled: bool) -> Self {
        self.auto_switch = Some(enabled);
        self
    }

    /// Set how long overpressure must persist before a hose fails.
    #[must_use]
    pub const fn burst_delay_secs(mut self, secs: f64) -> Self {
        self.burst_delay_secs = Some(secs);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> PanelConfig {
        let mut config = PanelConfig::default();

        if let Some((kp, ki, kd)) = self.gains {
            config.governor.kp = kp;
            config.governor.ki = ki;
            config.governor.kd = kd;
        }

        if let Some(enabled) = self.auto_switch {
            config.governor.auto_switch = enabled;
        }

        if let Some(secs) = self.burst_delay_secs {
            config.failure.burst_delay_secs = secs;
        }

        if let Some(jidoka) = self.jidoka {
            config.jidoka = jidoka;
        }

        config
    }
}

/// Governor tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct GovernorConfig {
    /// Proportional gain (RPM per PSI).
    #[validate(range(min = 0.0, max = 100.0))]
    pub kp: f64,
    /// Integral gain.
    #[validate(range(min = 0.0, max = 100.0))]
    pub ki: f64,
    /// Derivative gain.
    #[validate(range(min = 0.0, max = 100.0))]
    pub kd: f64,
    /// Anti-windup bound on the integrator (PSI·s).
    #[validate(range(min = 0.0))]
    pub integral_limit: f64,
    /// Lowest speed the governor will command.
    #[validate(range(min = 0.0, max = 3000.0))]
    pub min_rpm: f64,
    /// Highest speed the governor will command.
    #[validate(range(min = 0.0, max = 3000.0))]
    pub max_rpm: f64,
    /// Apply hysteretic mode switching automatically each tick.
    pub auto_switch: bool,
    /// Pressure above which PRESSURE mode hunts (PSI).
    #[validate(range(min = 50.0, max = 400.0))]
    pub pressure_mode_max_psi: f64,
    /// Dead band below `pressure_mode_max_psi` before switching back (PSI).
    #[validate(range(min = 0.0, max = 100.0))]
    pub hysteresis_psi: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            kp: 0.6,
            ki: 0.08,
            kd: 0.02,
            integral_limit: 1000.0,
            min_rpm: 700.0,
            max_rpm: 2200.0,
            auto_switch: true,
            pressure_mode_max_psi: 250.0,
            hysteresis_psi: 10.0,
        }
    }
}

/// Thermal model rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ThermalConfig {
    /// Pump heating rate when churning without flow (°F/s).
    #[validate(range(min = 0.0, max = 100.0))]
    pub heat_rate_f_per_s: f64,
    /// Pump cooling rate while flowing water (°F/s).
    #[validate(range(min = 0.0, max = 100.0))]
    pub flowing_cool_rate_f_per_s: f64,
    /// Pump cooling rate when disengaged (°F/s).
    #[validate(range(min = 0.0, max = 100.0))]
    pub idle_cool_rate_f_per_s: f64,
    /// Flow below which the pump churns and heats (GPM).
    #[validate(range(min = 0.0, max = 500.0))]
    pub min_cooling_flow_gpm: f64,
    /// Fraction of the engine temperature gap closed per second.
    #[validate(range(min = 0.0, max = 1.0))]
    pub engine_approach_rate: f64,
    /// Flow through a fully open tank fill / recirculation valve (GPM).
    #[validate(range(min = 0.0, max = 500.0))]
    pub recirc_max_gpm: f64,
    /// Pump overheating threshold (°F).
    #[validate(range(min = 70.0, max = 250.0))]
    pub pump_overheat_f: f64,
    /// Engine overheating threshold (°F).
    #[validate(range(min = 140.0, max = 250.0))]
    pub engine_overheat_f: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            heat_rate_f_per_s: 5.0,
            flowing_cool_rate_f_per_s: 2.0,
            idle_cool_rate_f_per_s: 1.0,
            min_cooling_flow_gpm: 10.0,
            engine_approach_rate: 0.1,
            recirc_max_gpm: 50.0,
            pump_overheat_f: 200.0,
            engine_overheat_f: 230.0,
        }
    }
}

/// Failure thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct FailureConfig {
    /// Pressure above which hoses are overstressed (PSI).
    #[validate(range(min = 100.0, max = 1000.0))]
    pub burst_threshold_psi: f64,
    /// Sustained overpressure before a hose fails (s).
    #[validate(range(min = 0.1, max = 600.0))]
    pub burst_delay_secs: f64,
    /// Hard ceiling applied to the achieved pressure (PSI).
    #[validate(range(min = 100.0, max = 1000.0))]
    pub pdp_ceiling_psi: f64,
    /// Intake pressure below which a fast pump cavitates (PSI).
    #[validate(range(min = 0.0, max = 100.0))]
    pub cavitation_intake_psi: f64,
    /// Speed above which low intake pressure cavitates.
    #[validate(range(min = 0.0, max = 3000.0))]
    pub cavitation_rpm: f64,
    /// Fraction of pressure lost while cavitating.
    #[validate(range(min = 0.0, max = 1.0))]
    pub cavitation_derate: f64,
    /// Fraction of pressure lost when overheating while drafting.
    #[validate(range(min = 0.0, max = 1.0))]
    pub draft_overheat_derate: f64,
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            burst_threshold_psi: 400.0,
            burst_delay_secs: 5.0,
            pdp_ceiling_psi: 400.0,
            cavitation_intake_psi: 5.0,
            cavitation_rpm: 2000.0,
            cavitation_derate: 0.20,
            draft_overheat_derate: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PanelConfig::default();

        assert_eq!(config.schema_version, "1.0");
        assert!((config.governor.kp - 0.6).abs() < f64::EPSILON);
        assert!((config.governor.ki - 0.08).abs() < f64::EPSILON);
        assert!((config.governor.kd - 0.02).abs() < f64::EPSILON);
        assert!((config.failure.burst_threshold_psi - 400.0).abs() < f64::EPSILON);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PanelConfig::builder()
            .gains(1.0, 0.1, 0.0)
            .auto_switch(false)
            .burst_delay_secs(2.0)
            .build();

        assert!((config.governor.kp - 1.0).abs() < f64::EPSILON);
        assert!(!config.governor.auto_switch);
        assert!((config.failure.burst_delay_secs - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_empty_yaml_is_default() {
        let config = PanelConfig::from_yaml("{}").expect("empty document");
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_config_yaml_partial_override() {
        let yaml = r"
governor:
  kp: 0.9
  auto_switch: false
failure:
  burst_delay_secs: 3.0
";
        let config = PanelConfig::from_yaml(yaml).expect("valid yaml");
        assert!((config.governor.kp - 0.9).abs() < f64::EPSILON);
        assert!((config.governor.ki - 0.08).abs() < f64::EPSILON);
        assert!(!config.governor.auto_switch);
        assert!((config.failure.burst_delay_secs - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_rejects_unknown_field() {
        let yaml = r"
governor:
  kq: 0.9
";
        assert!(PanelConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range() {
        let yaml = r"
thermal:
  engine_approach_rate: 4.0
";
        let err = PanelConfig::from_yaml(yaml).expect_err("range violation");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_config_rejects_inverted_rpm_band() {
        let yaml = r"
governor:
  min_rpm: 2200
  max_rpm: 700
";
        let err = PanelConfig::from_yaml(yaml).expect_err("inverted band");
        assert!(err.to_string().contains("min_rpm"));
    }

    #[test]
    fn test_config_rejects_ceiling_below_burst() {
        let yaml = r"
failure:
  pdp_ceiling_psi: 300
";
        assert!(PanelConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("panel.yaml");
        std::fs::write(&path, "governor:\n  kd: 0.05\n").expect("write");
        let config = PanelConfig::load(&path).expect("load");
        assert!((config.governor.kd - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = PanelConfig::load("/nonexistent/panel.yaml").expect_err("missing");
        assert!(matches!(err, PanelError::Io(_)));
    }
}
