//! Pump casing and engine coolant temperatures.
//!
//! # Governing Equations
//!
//! ```text
//! Pump:    dT/dt = +5 °F/s  (engaged, Q_cool < 10 GPM)
//!                  −2 °F/s  (engaged, Q_cool ≥ 10 GPM)
//!                  −1 °F/s  (disengaged)
//! Engine:  dT/dt = k · (T_target − T),  T_target = 180 + 40 · N / 3000
//! ```
//!
//! A pump churning with no water through it heats fast; that is what the
//! recirculation valve is for.
//!
//! Pump warnings are tiered (elevated, overheating, boiling) and only the
//! most severe tier is shown; each tier's message carries its own action.

use crate::config::ThermalConfig;
use crate::model::ThermalState;

/// Pump casing temperature bounds (°F).
pub const PUMP_TEMP_MIN_F: f64 = 70.0;
/// Upper bound on pump casing temperature (°F).
pub const PUMP_TEMP_MAX_F: f64 = 250.0;
/// Engine coolant temperature bounds (°F).
pub const ENGINE_TEMP_MIN_F: f64 = 140.0;
/// Upper bound on engine coolant temperature (°F).
pub const ENGINE_TEMP_MAX_F: f64 = 250.0;
/// Pump temperature at which the panel first cautions (°F).
pub const PUMP_ELEVATED_F: f64 = 180.0;
/// Pump temperature at which water in the casing boils (°F).
pub const PUMP_BOILING_F: f64 = 212.0;

const ENGINE_BASE_F: f64 = 180.0;
const ENGINE_LOAD_RISE_F: f64 = 40.0;
const ENGINE_FULL_LOAD_RPM: f64 = 3000.0;
const PUMP_HINT: &str = "open recirculation or flow a line";

/// What drives the temperatures this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalInputs {
    /// Pump transmission engaged.
    pub engaged: bool,
    /// Discharge plus recirculation flow through the casing (GPM).
    pub cooling_flow_gpm: f64,
    /// Engine speed.
    pub rpm: f64,
}

/// Recirculation flow for a tank-fill valve position.
#[must_use]
pub fn recirculation_gpm(recirc_pct: f64, config: &ThermalConfig) -> f64 {
    recirc_pct.clamp(0.0, 100.0) / 100.0 * config.recirc_max_gpm
}

/// Engine coolant temperature the engine settles at for a speed.
#[must_use]
pub fn engine_target_f(rpm: f64) -> f64 {
    ENGINE_BASE_F + (rpm / ENGINE_FULL_LOAD_RPM) * ENGINE_LOAD_RISE_F
}

/// Advance both temperatures by `dt` seconds.
#[must_use]
pub fn update_thermal(
    state: &ThermalState,
    inputs: ThermalInputs,
    dt: f64,
    config: &ThermalConfig,
) -> ThermalState {
    let pump_rate = if !inputs.engaged {
        -config.idle_cool_rate_f_per_s
    } else if inputs.cooling_flow_gpm < config.min_cooling_flow_gpm {
        config.heat_rate_f_per_s
    } else {
        -config.flowing_cool_rate_f_per_s
    };
    let pump_temp_f = (state.pump_temp_f + pump_rate * dt).clamp(PUMP_TEMP_MIN_F, PUMP_TEMP_MAX_F);

    // First-order lag; a long tick lands on the target rather than past it.
    let approach = (config.engine_approach_rate * dt).clamp(0.0, 1.0);
    let gap = engine_target_f(inputs.rpm) - state.engine_temp_f;
    let engine_temp_f =
        (state.engine_temp_f + gap * approach).clamp(ENGINE_TEMP_MIN_F, ENGINE_TEMP_MAX_F);

    ThermalState {
        pump_temp_f,
        engine_temp_f,
    }
}

/// Pump casing above its overheat threshold.
#[must_use]
pub fn pump_overheating(state: &ThermalState, config: &ThermalConfig) -> bool {
    state.pump_temp_f > config.pump_overheat_f
}

/// Engine coolant above its overheat threshold.
#[must_use]
pub fn engine_overheating(state: &ThermalState, config: &ThermalConfig) -> bool {
    state.engine_temp_f > config.engine_overheat_f
}

/// Temperature warnings, most severe pump tier only.
#[must_use]
pub fn thermal_warnings(state: &ThermalState, config: &ThermalConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let pump = state.pump_temp_f;

    if pump > PUMP_BOILING_F {
        warnings.push(format!(
            "CRITICAL: pump water boiling at {pump:.0}°F: {PUMP_HINT} immediately"
        ));
    } else if pump_overheating(state, config) {
        warnings.push(format!("Pump overheating at {pump:.0}°F: {PUMP_HINT}"));
    } else if pump > PUMP_ELEVATED_F {
        warnings.push(format!("Pump temperature elevated at {pump:.0}°F: {PUMP_HINT}"));
    }

    if engine_overheating(state, config) {
        warnings.push(format!(
            "Engine overheating at {:.0}°F: reduce RPM",
            state.engine_temp_f
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ThermalConfig {
        ThermalConfig::default()
    }

    fn at(pump: f64, engine: f64) -> ThermalState {
        ThermalState {
            pump_temp_f: pump,
            engine_temp_f: engine,
        }
    }

    #[test]
    fn test_churning_pump_heats() {
        let inputs = ThermalInputs {
            engaged: true,
            cooling_flow_gpm: 0.0,
            rpm: 1000.0,
        };
        let next = update_thermal(&at(100.0, 180.0), inputs, 2.0, &cfg());
        assert!((next.pump_temp_f - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_flowing_pump_cools() {
        let inputs = ThermalInputs {
            engaged: true,
            cooling_flow_gpm: 10.0,
            rpm: 1000.0,
        };
        let next = update_thermal(&at(150.0, 180.0), inputs, 1.0, &cfg());
        assert!((next.pump_temp_f - 148.0).abs() < 1e-9);
    }

    #[test]
    fn test_disengaged_pump_cools_slowly() {
        let inputs = ThermalInputs {
            engaged: false,
            cooling_flow_gpm: 0.0,
            rpm: 0.0,
        };
        let next = update_thermal(&at(150.0, 180.0), inputs, 1.0, &cfg());
        assert!((next.pump_temp_f - 149.0).abs() < 1e-9);
    }

    #[test]
    fn test_pump_temperature_clamped() {
        let hot = ThermalInputs {
            engaged: true,
            cooling_flow_gpm: 0.0,
            rpm: 1000.0,
        };
        assert!((update_thermal(&at(245.0, 180.0), hot, 10.0, &cfg()).pump_temp_f - 250.0).abs() < f64::EPSILON);

        let cold = ThermalInputs {
            engaged: false,
            ..hot
        };
        assert!((update_thermal(&at(71.0, 180.0), cold, 10.0, &cfg()).pump_temp_f - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_engine_approaches_target() {
        assert!((engine_target_f(1500.0) - 200.0).abs() < 1e-9);

        let inputs = ThermalInputs {
            engaged: true,
            cooling_flow_gpm: 100.0,
            rpm: 1500.0,
        };
        let next = update_thermal(&at(100.0, 160.0), inputs, 1.0, &cfg());
        assert!((next.engine_temp_f - 164.0).abs() < 1e-9);

        let settled = update_thermal(&at(100.0, 160.0), inputs, 60.0, &cfg());
        assert!((settled.engine_temp_f - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dt_unchanged() {
        let inputs = ThermalInputs {
            engaged: true,
            cooling_flow_gpm: 0.0,
            rpm: 2200.0,
        };
        let start = at(120.0, 170.0);
        assert_eq!(update_thermal(&start, inputs, 0.0, &cfg()), start);
    }

    #[test]
    fn test_recirculation_flow() {
        assert!((recirculation_gpm(50.0, &cfg()) - 25.0).abs() < f64::EPSILON);
        assert!((recirculation_gpm(200.0, &cfg()) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_warning_tiers() {
        let c = cfg();
        assert!(thermal_warnings(&at(170.0, 190.0), &c).is_empty());
        assert!(thermal_warnings(&at(185.0, 190.0), &c)[0].contains("elevated"));
        let w = thermal_warnings(&at(205.0, 190.0), &c);
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("overheating"));
        let w = thermal_warnings(&at(215.0, 235.0), &c);
        assert_eq!(w.len(), 2);
        assert!(w[0].starts_with("CRITICAL"));
        assert!(w[1].contains("Engine"));
    }

    #[test]
    fn test_overheat_flags() {
        let c = cfg();
        assert!(!pump_overheating(&at(200.0, 160.0), &c));
        assert!(pump_overheating(&at(200.5, 160.0), &c));
        assert!(engine_overheating(&at(70.0, 231.0), &c));
    }
}
