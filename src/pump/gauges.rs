//! Intake pressure policy and the panel's master gauges.

use serde::{Deserialize, Serialize};

use crate::model::WaterSource;
use crate::units::compound_reading;

/// Tank head seen at the intake with the tank-to-pump valve open (PSI).
pub const TANK_INTAKE_PSI: f64 = 45.0;
/// Hydrant residual assumed when none is set (PSI).
pub const DEFAULT_HYDRANT_PSI: f64 = 50.0;
/// Relay supply assumed when none is set (PSI).
pub const DEFAULT_RELAY_PSI: f64 = 20.0;
/// Intake pressure while drafting with a good prime (PSI).
pub const DRAFT_PRIMED_PSI: f64 = -12.0;
/// Intake pressure while drafting without a prime (PSI).
pub const DRAFT_UNPRIMED_PSI: f64 = -22.0;
/// Lowest hydrant residual before the panel warns (PSI).
pub const HYDRANT_RESIDUAL_MIN_PSI: f64 = 20.0;
/// Vacuum reading above which the panel warns (inHg).
pub const HIGH_VACUUM_INHG: f64 = 25.0;
/// Full scale of the master discharge gauge (PSI).
pub const DISCHARGE_GAUGE_MAX_PSI: f64 = 600.0;
/// Discharge reading above which the panel warns (PSI).
pub const DISCHARGE_WARN_PSI: f64 = 300.0;

/// Water supply as seen by the intake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntakeSupply {
    /// Selected source.
    pub source: WaterSource,
    /// Explicit hydrant/relay pressure, if set.
    pub supply_psi: Option<f64>,
    /// Tank-to-pump valve open.
    pub tank_to_pump_open: bool,
    /// Water left in the booster tank (gallons).
    pub tank_gal: f64,
    /// Pump primed.
    pub primed: bool,
}

impl IntakeSupply {
    /// Intake pressure for this supply (PSI, negative under vacuum).
    #[must_use]
    pub fn intake_psi(&self) -> f64 {
        match self.source {
            WaterSource::Tank => {
                if self.tank_to_pump_open && self.tank_gal > 0.0 {
                    TANK_INTAKE_PSI
                } else {
                    0.0
                }
            }
            WaterSource::Hydrant => self.supply_psi.unwrap_or(DEFAULT_HYDRANT_PSI),
            WaterSource::Draft => {
                if self.primed {
                    DRAFT_PRIMED_PSI
                } else {
                    DRAFT_UNPRIMED_PSI
                }
            }
            WaterSource::Relay => self.supply_psi.unwrap_or(DEFAULT_RELAY_PSI),
        }
    }

    /// Whether the pump has any water to move.
    #[must_use]
    pub fn has_water(&self) -> bool {
        match self.source {
            WaterSource::Tank => self.tank_to_pump_open && self.tank_gal > 0.0,
            WaterSource::Draft => self.primed,
            WaterSource::Hydrant | WaterSource::Relay => true,
        }
    }
}

/// Compound intake gauge reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeReading {
    /// Pressure face (PSI).
    pub psi: f64,
    /// Vacuum face (inHg).
    pub vacuum_inhg: f64,
    /// Supply problem the operator should see.
    pub warning: Option<String>,
}

/// Map an intake pressure onto the compound gauge.
#[must_use]
pub fn intake_gauge(
    source: WaterSource,
    intake_psi: f64,
    tank_to_pump_open: bool,
    primed: bool,
) -> IntakeReading {
    let (psi, vacuum_inhg) = compound_reading(intake_psi);

    let warning = match source {
        WaterSource::Draft if !primed => {
            Some("Drafting without prime: operate the primer before opening discharges".to_string())
        }
        WaterSource::Tank if !tank_to_pump_open => {
            Some("Tank-to-pump valve closed: no water supply".to_string())
        }
        WaterSource::Hydrant if intake_psi < HYDRANT_RESIDUAL_MIN_PSI => Some(format!(
            "Hydrant residual {intake_psi:.0} PSI below {HYDRANT_RESIDUAL_MIN_PSI:.0} PSI: reduce flow"
        )),
        _ if vacuum_inhg > HIGH_VACUUM_INHG => Some(format!(
            "High intake vacuum {vacuum_inhg:.1} inHg: check strainer and lift"
        )),
        _ => None,
    };

    IntakeReading {
        psi,
        vacuum_inhg,
        warning,
    }
}

/// Master discharge gauge reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeReading {
    /// Displayed pressure (PSI).
    pub psi: f64,
    /// High-pressure warning.
    pub warning: Option<String>,
}

/// Map a discharge pressure onto the master gauge.
#[must_use]
pub fn discharge_gauge(pdp_psi: f64) -> DischargeReading {
    let psi = pdp_psi.clamp(0.0, DISCHARGE_GAUGE_MAX_PSI);
    let warning = (psi > DISCHARGE_WARN_PSI)
        .then(|| format!("Discharge pressure {psi:.0} PSI above {DISCHARGE_WARN_PSI:.0} PSI"));
    DischargeReading { psi, warning }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(source: WaterSource) -> IntakeSupply {
        IntakeSupply {
            source,
            supply_psi: None,
            tank_to_pump_open: true,
            tank_gal: 500.0,
            primed: false,
        }
    }

    #[test]
    fn test_tank_intake() {
        assert!((supply(WaterSource::Tank).intake_psi() - 45.0).abs() < f64::EPSILON);

        let closed = IntakeSupply {
            tank_to_pump_open: false,
            ..supply(WaterSource::Tank)
        };
        assert!(closed.intake_psi().abs() < f64::EPSILON);
        assert!(!closed.has_water());

        let empty = IntakeSupply {
            tank_gal: 0.0,
            ..supply(WaterSource::Tank)
        };
        assert!(empty.intake_psi().abs() < f64::EPSILON);
        assert!(!empty.has_water());
    }

    #[test]
    fn test_pressurized_defaults_and_overrides() {
        assert!((supply(WaterSource::Hydrant).intake_psi() - 50.0).abs() < f64::EPSILON);
        assert!((supply(WaterSource::Relay).intake_psi() - 20.0).abs() < f64::EPSILON);

        let strong = IntakeSupply {
            supply_psi: Some(80.0),
            ..supply(WaterSource::Hydrant)
        };
        assert!((strong.intake_psi() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_draft_vacuum_values() {
        let unprimed = supply(WaterSource::Draft);
        assert!((unprimed.intake_psi() - -22.0).abs() < f64::EPSILON);
        assert!(!unprimed.has_water());

        let primed = IntakeSupply {
            primed: true,
            ..unprimed
        };
        assert!((primed.intake_psi() - -12.0).abs() < f64::EPSILON);
        assert!(primed.has_water());
    }

    #[test]
    fn test_intake_gauge_faces() {
        let r = intake_gauge(WaterSource::Hydrant, 50.0, true, false);
        assert!((r.psi - 50.0).abs() < f64::EPSILON);
        assert!(r.vacuum_inhg.abs() < f64::EPSILON);
        assert!(r.warning.is_none());

        let r = intake_gauge(WaterSource::Draft, -12.0, true, true);
        assert!(r.psi.abs() < f64::EPSILON);
        assert!((r.vacuum_inhg - 24.4).abs() < 0.1);
        assert!(r.warning.is_none());

        let r = intake_gauge(WaterSource::Relay, -13.0, true, false);
        assert!(r.warning.is_some_and(|w| w.contains("vacuum")));
    }

    #[test]
    fn test_intake_gauge_warnings() {
        let r = intake_gauge(WaterSource::Draft, -22.0, true, false);
        assert!(r.warning.is_some_and(|w| w.contains("prime")));
        assert!((r.vacuum_inhg - 30.0).abs() < f64::EPSILON);

        let r = intake_gauge(WaterSource::Tank, 0.0, false, false);
        assert!(r.warning.is_some_and(|w| w.contains("Tank-to-pump")));

        let r = intake_gauge(WaterSource::Hydrant, 15.0, true, false);
        assert!(r.warning.is_some_and(|w| w.contains("residual")));
    }

    #[test]
    fn test_discharge_gauge() {
        let r = discharge_gauge(150.0);
        assert!((r.psi - 150.0).abs() < f64::EPSILON);
        assert!(r.warning.is_none());

        assert!(discharge_gauge(-5.0).psi.abs() < f64::EPSILON);
        assert!((discharge_gauge(900.0).psi - 600.0).abs() < f64::EPSILON);
        assert!(discharge_gauge(320.0).warning.is_some());
    }
}
