//! Jidoka (自働化): stop the session when a tick produces a defective state.
//!
//! Physical extremes are never defects: the tick clamps them and raises a
//! panel warning. What the guard catches is a tick that failed to clamp,
//! or arithmetic that went non-finite. Either means the model is wrong, so
//! the session refuses to commit the state and the line stops.
//!
//! # Checks
//!
//! 1. **Non-finite values**: NaN or Inf in any numeric field
//! 2. **Bounds**: every clamped field inside its documented range

use serde::{Deserialize, Serialize};

use crate::config::PanelConfig;
use crate::error::{PanelError, PanelResult};
use crate::model::PanelState;
use crate::profile::IDLE_RPM;
use crate::pump::governor::{TARGET_PDP_MAX, TARGET_PDP_MIN, TARGET_RPM_MAX, TARGET_RPM_MIN};
use crate::pump::gauges::DISCHARGE_GAUGE_MAX_PSI;
use crate::pump::GovernorState;
use crate::thermal::{ENGINE_TEMP_MAX_F, ENGINE_TEMP_MIN_F, PUMP_TEMP_MAX_F, PUMP_TEMP_MIN_F};
use crate::units::VACUUM_GAUGE_MAX_INHG;

/// Jidoka guard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    pub check_finite: bool,
    /// Range checks on clamped fields enabled.
    pub check_bounds: bool,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_bounds: true,
        }
    }
}

/// Guard run on every new state before the session commits it.
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    config: JidokaConfig,
    integral_limit: f64,
    max_rpm: f64,
}

impl JidokaGuard {
    /// Create a guard with the default governor limits.
    #[must_use]
    pub fn new(config: JidokaConfig) -> Self {
        Self::from_config(&PanelConfig {
            jidoka: config,
            ..PanelConfig::default()
        })
    }

    /// Create from panel configuration.
    #[must_use]
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            config: config.jidoka.clone(),
            integral_limit: config.governor.integral_limit,
            max_rpm: config.governor.max_rpm.max(IDLE_RPM),
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }

    /// Inspect a tick's output.
    ///
    /// # Errors
    ///
    /// Returns [`PanelError::NonFiniteValue`] or
    /// [`PanelError::InvariantViolation`] naming the first bad field.
    pub fn check(&self, state: &PanelState, governor: &GovernorState) -> PanelResult<()> {
        let fields = numeric_fields(state, governor);

        if self.config.check_finite {
            if let Some((location, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(PanelError::non_finite(location.clone()));
            }
        }

        if self.config.check_bounds {
            self.check_bounds(state, governor)?;
        }

        Ok(())
    }

    fn check_bounds(&self, state: &PanelState, governor: &GovernorState) -> PanelResult<()> {
        let mut bounds = vec![
            ("runtime.rpm", state.runtime.rpm, 0.0, self.max_rpm),
            ("throttle_pct", state.throttle_pct, 0.0, 100.0),
            ("recirc_pct", state.recirc_pct, 0.0, 100.0),
            ("water_tank_gal", state.water_tank_gal, 0.0, state.water_tank_capacity_gal),
            ("foam.remaining_gal", state.foam.remaining_gal, 0.0, state.foam.capacity_gal),
            ("thermal.pump_temp_f", state.thermal.pump_temp_f, PUMP_TEMP_MIN_F, PUMP_TEMP_MAX_F),
            (
                "thermal.engine_temp_f",
                state.thermal.engine_temp_f,
                ENGINE_TEMP_MIN_F,
                ENGINE_TEMP_MAX_F,
            ),
            ("gauges.discharge_psi", state.gauges.discharge_psi, 0.0, DISCHARGE_GAUGE_MAX_PSI),
            ("gauges.vacuum_inhg", state.gauges.vacuum_inhg, 0.0, VACUUM_GAUGE_MAX_INHG),
            ("overpressure_secs", state.overpressure_secs, 0.0, f64::MAX),
            ("governor.target_rpm", governor.target_rpm(), TARGET_RPM_MIN, TARGET_RPM_MAX),
            ("governor.target_pdp_psi", governor.target_pdp_psi(), TARGET_PDP_MIN, TARGET_PDP_MAX),
            ("governor.integral", governor.integral(), -self.integral_limit, self.integral_limit),
        ];
        bounds.extend(
            state
                .valves
                .iter()
                .map(|(id, &pct)| (id.key(), pct, 0.0, 100.0)),
        );

        for (name, value, min, max) in bounds {
            if value < min || value > max {
                return Err(PanelError::InvariantViolation {
                    name: name.to_string(),
                    value,
                    min,
                    max,
                });
            }
        }

        for &line in &state.burst_lines {
            if state.valves[line] > 0.0 {
                return Err(PanelError::InvariantViolation {
                    name: format!("{} (burst)", line.key()),
                    value: state.valves[line],
                    min: 0.0,
                    max: 0.0,
                });
            }
        }

        Ok(())
    }
}

fn numeric_fields(state: &PanelState, governor: &GovernorState) -> Vec<(String, f64)> {
    let mut fields: Vec<(String, f64)> = [
        ("throttle_pct", state.throttle_pct),
        ("recirc_pct", state.recirc_pct),
        ("water_tank_gal", state.water_tank_gal),
        ("foam.remaining_gal", state.foam.remaining_gal),
        ("foam.percent", state.foam.percent),
        ("runtime.rpm", state.runtime.rpm),
        ("relief.setpoint_psi", state.relief.setpoint_psi),
        ("relief.bypass_gpm", state.relief.bypass_gpm),
        ("gauges.intake_psi", state.gauges.intake_psi),
        ("gauges.vacuum_inhg", state.gauges.vacuum_inhg),
        ("gauges.discharge_psi", state.gauges.discharge_psi),
        ("gauges.flow_gpm", state.gauges.flow_gpm),
        ("thermal.pump_temp_f", state.thermal.pump_temp_f),
        ("thermal.engine_temp_f", state.thermal.engine_temp_f),
        ("overpressure_secs", state.overpressure_secs),
        ("governor.integral", governor.integral()),
        ("governor.previous_error", governor.previous_error()),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect();

    fields.extend(
        state
            .valves
            .iter()
            .map(|(id, &pct)| (format!("valves.{}", id.key()), pct)),
    );
    fields
}
