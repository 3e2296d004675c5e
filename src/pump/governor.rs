//! Pressure governor: PID loop plus the RPM/PRESSURE mode machine.
//!
//! # Governing Equations
//!
//! ```text
//! e(t)   = PDP_target − PDP_measured
//! I(t)   = clamp(I(t−Δt) + e·Δt, −I_max, I_max)
//! D(t)   = (e(t) − e(t−Δt)) / Δt
//! N(t)   = clamp(N(t−Δt) + Kp·e + Ki·I + Kd·D, N_min, N_max)
//! ```
//!
//! # Mode switching
//!
//! PRESSURE mode hunts above 250 PSI, so the governor drops to RPM mode
//! there. It only returns once pressure falls below 240 PSI and the pump
//! is not drafting; the 10 PSI dead band keeps it from chattering.
//!
//! Every session owns its own [`GovernorState`]. The integrator is the
//! only controller memory carried between ticks, so sharing one state
//! between sessions would corrupt both loops.

use serde::{Deserialize, Serialize};

use crate::config::GovernorConfig;
use crate::model::{GovernorMode, WaterSource};

/// Lowest operator-settable target speed.
pub const TARGET_RPM_MIN: f64 = 700.0;
/// Highest operator-settable target speed.
pub const TARGET_RPM_MAX: f64 = 2200.0;
/// Lowest operator-settable target pressure.
pub const TARGET_PDP_MIN: f64 = 50.0;
/// Highest operator-settable target pressure.
pub const TARGET_PDP_MAX: f64 = 250.0;
/// Target speed added per percent of throttle.
pub const RPM_PER_THROTTLE_PCT: f64 = 15.0;
/// Pressure at which the panel cautions the operator.
pub const CAUTION_PSI: f64 = 350.0;
/// Pressure at which the panel shows a danger warning.
pub const DANGER_PSI: f64 = 400.0;

/// Governor memory carried from tick to tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernorState {
    mode: GovernorMode,
    target_rpm: f64,
    target_pdp_psi: f64,
    integral: f64,
    previous_error: f64,
}

impl Default for GovernorState {
    fn default() -> Self {
        Self {
            mode: GovernorMode::Pressure,
            target_rpm: TARGET_RPM_MIN,
            target_pdp_psi: 150.0,
            integral: 0.0,
            previous_error: 0.0,
        }
    }
}

/// Result of one governor update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GovernorOutput {
    /// Governor memory for the next tick.
    pub state: GovernorState,
    /// Commanded engine speed for this tick.
    pub rpm: f64,
}

impl GovernorState {
    /// Fresh governor in PRESSURE mode holding 150 PSI.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> GovernorMode {
        self.mode
    }

    /// Speed held in RPM mode.
    #[must_use]
    pub const fn target_rpm(&self) -> f64 {
        self.target_rpm
    }

    /// Pressure held in PRESSURE mode.
    #[must_use]
    pub const fn target_pdp_psi(&self) -> f64 {
        self.target_pdp_psi
    }

    /// Accumulated integral term (PSI·s).
    #[must_use]
    pub const fn integral(&self) -> f64 {
        self.integral
    }

    /// Error seen on the previous update (PSI).
    #[must_use]
    pub const fn previous_error(&self) -> f64 {
        self.previous_error
    }

    /// Switch mode. A real change clears the integrator and previous error.
    #[must_use]
    pub const fn with_mode(self, mode: GovernorMode) -> Self {
        if matches!(
            (self.mode, mode),
            (GovernorMode::Rpm, GovernorMode::Rpm) | (GovernorMode::Pressure, GovernorMode::Pressure)
        ) {
            return self;
        }
        Self {
            mode,
            integral: 0.0,
            previous_error: 0.0,
            ..self
        }
    }

    /// Set the RPM-mode target, clamped to the governor band.
    #[must_use]
    pub fn with_target_rpm(self, rpm: f64) -> Self {
        Self {
            target_rpm: clamp_or(rpm, TARGET_RPM_MIN, TARGET_RPM_MAX, self.target_rpm),
            ..self
        }
    }

    /// Map a hand throttle position onto the RPM-mode target.
    #[must_use]
    pub fn with_throttle(self, throttle_pct: f64) -> Self {
        self.with_target_rpm(throttle_to_rpm(throttle_pct))
    }

    /// Set the PRESSURE-mode target, clamped to the governor band.
    #[must_use]
    pub fn with_target_pdp(self, psi: f64) -> Self {
        Self {
            target_pdp_psi: clamp_or(psi, TARGET_PDP_MIN, TARGET_PDP_MAX, self.target_pdp_psi),
            ..self
        }
    }

    /// Advance the governor by `dt` seconds.
    ///
    /// In RPM mode the stored target is reported unchanged. In PRESSURE
    /// mode the PID loop adjusts `current_rpm` toward the target pressure.
    /// A zero time slice leaves speed and controller memory untouched.
    #[must_use]
    pub fn update(
        &self,
        current_rpm: f64,
        measured_pdp_psi: f64,
        dt: f64,
        config: &GovernorConfig,
    ) -> GovernorOutput {
        match self.mode {
            GovernorMode::Rpm => GovernorOutput {
                state: *self,
                rpm: self.target_rpm.clamp(config.min_rpm, config.max_rpm),
            },
            GovernorMode::Pressure => {
                if dt <= 0.0 {
                    return GovernorOutput {
                        state: *self,
                        rpm: current_rpm.clamp(config.min_rpm, config.max_rpm),
                    };
                }

                let error = self.target_pdp_psi - measured_pdp_psi;
                let integral = (self.integral + error * dt)
                    .clamp(-config.integral_limit, config.integral_limit);
                let derivative = (error - self.previous_error) / dt;
                let delta_rpm =
                    config.kp * error + config.ki * integral + config.kd * derivative;

                GovernorOutput {
                    state: Self {
                        integral,
                        previous_error: error,
                        ..*self
                    },
                    rpm: (current_rpm + delta_rpm).clamp(config.min_rpm, config.max_rpm),
                }
            }
        }
    }

    /// Apply hysteretic auto-switching after a tick.
    ///
    /// Entering PRESSURE mode adopts the current pressure as the target and
    /// entering RPM mode adopts the current speed, so the handover is
    /// bumpless. Returns the new state and the mode switched to, if any.
    #[must_use]
    pub fn auto_switch(
        self,
        pdp_psi: f64,
        rpm: f64,
        drafting: bool,
        config: &GovernorConfig,
    ) -> (Self, Option<GovernorMode>) {
        match auto_switch_mode(self.mode, pdp_psi, drafting, config) {
            Some(GovernorMode::Pressure) => (
                self.with_mode(GovernorMode::Pressure).with_target_pdp(pdp_psi),
                Some(GovernorMode::Pressure),
            ),
            Some(GovernorMode::Rpm) => (
                self.with_mode(GovernorMode::Rpm).with_target_rpm(rpm),
                Some(GovernorMode::Rpm),
            ),
            None => (self, None),
        }
    }
}

/// Hand throttle position (0-100 %) to RPM-mode target speed.
#[must_use]
pub fn throttle_to_rpm(throttle_pct: f64) -> f64 {
    TARGET_RPM_MIN + throttle_pct.clamp(0.0, 100.0) * RPM_PER_THROTTLE_PCT
}

/// Throttle position that would command `rpm` in RPM mode.
#[must_use]
pub fn rpm_to_throttle(rpm: f64) -> f64 {
    ((rpm - TARGET_RPM_MIN) / RPM_PER_THROTTLE_PCT).clamp(0.0, 100.0)
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Outcome of checking whether the current mode suits the operating point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeValidation {
    /// Whether the mode is appropriate.
    pub valid: bool,
    /// Mode the panel recommends switching to.
    pub recommended: Option<GovernorMode>,
    /// Why the mode is inappropriate.
    pub reason: Option<String>,
}

/// Check the governor mode against pressure and water source.
///
/// RPM mode belongs to drafting and very high pressure work; PRESSURE
/// mode hunts above the configured ceiling.
#[must_use]
pub fn validate_governor_mode(
    mode: GovernorMode,
    pdp_psi: f64,
    source: WaterSource,
    config: &GovernorConfig,
) -> ModeValidation {
    let drafting = source == WaterSource::Draft;
    let high = pdp_psi > config.pressure_mode_max_psi;

    match mode {
        GovernorMode::Rpm if drafting || high => ModeValidation {
            valid: true,
            recommended: None,
            reason: None,
        },
        GovernorMode::Rpm => ModeValidation {
            valid: false,
            recommended: Some(GovernorMode::Pressure),
            reason: Some(format!(
                "RPM mode is only for drafting or pressures above {:.0} PSI",
                config.pressure_mode_max_psi
            )),
        },
        GovernorMode::Pressure if high => ModeValidation {
            valid: false,
            recommended: Some(GovernorMode::Rpm),
            reason: Some(format!(
                "PRESSURE mode hunts above {:.0} PSI",
                config.pressure_mode_max_psi
            )),
        },
        GovernorMode::Pressure => ModeValidation {
            valid: true,
            recommended: None,
            reason: None,
        },
    }
}

/// Mode the governor should switch to, honoring the hysteresis band.
#[must_use]
pub fn auto_switch_mode(
    mode: GovernorMode,
    pdp_psi: f64,
    drafting: bool,
    config: &GovernorConfig,
) -> Option<GovernorMode> {
    let upper = config.pressure_mode_max_psi;
    let lower = upper - config.hysteresis_psi;

    match mode {
        GovernorMode::Pressure if pdp_psi > upper => Some(GovernorMode::Rpm),
        GovernorMode::Rpm if pdp_psi < lower && !drafting => Some(GovernorMode::Pressure),
        _ => None,
    }
}

/// Governor-related panel warnings for this operating point.
#[must_use]
pub fn governor_warnings(mode: GovernorMode, pdp_psi: f64, config: &GovernorConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if mode == GovernorMode::Rpm {
        warnings.push("Governor in RPM mode: no surge protection".to_string());
    }
    if mode == GovernorMode::Pressure && pdp_psi > config.pressure_mode_max_psi {
        warnings.push(format!(
            "PDP {pdp_psi:.0} PSI in PRESSURE mode: governor hunting risk, switch to RPM mode"
        ));
    }
    if pdp_psi > DANGER_PSI {
        warnings.push(format!(
            "DANGER: PDP {pdp_psi:.0} PSI exceeds {DANGER_PSI:.0} PSI hose limit"
        ));
    } else if pdp_psi > CAUTION_PSI {
        warnings.push(format!(
            "Caution: PDP {pdp_psi:.0} PSI approaching {DANGER_PSI:.0} PSI limit"
        ));
    }

    warnings
}
