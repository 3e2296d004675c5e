//! Hydraulics calculator: nozzle flow and per-line nozzle-back pressures.
//!
//! # Governing Equations
//!
//! ```text
//! Smooth bore:   Q = 29.7 · d² · √NP
//! Line flow:     Q_line = Q_nozzle · valve% / 100
//! Nozzle:        NP_actual = max(0, PDP − FL)
//! Required PDP:  PDP_req = NP_rated + FL (+ AL + EL, both zero)
//! ```
//!
//! The valve model is linear, which a real gate valve is not. Fog and
//! master-fog nozzles are treated as fixed-gallonage and ignore pressure.

pub mod friction;
pub mod pdp;

pub use friction::{FrictionModel, HazenWilliams};
pub use pdp::{pump_discharge_pressure, PdpInputs};

use crate::error::{PanelError, PanelResult};
use crate::model::{HoseSpec, LineConfig, LineHydraulics, NozzleSpec};

/// Freeman coefficient for smooth-bore discharge.
pub const SMOOTH_BORE_COEFFICIENT: f64 = 29.7;

/// Rated nozzle pressure, handline smooth bore (PSI).
pub const HANDLINE_SMOOTH_NP: f64 = 50.0;
/// Rated nozzle pressure, handline fog (PSI).
pub const HANDLINE_FOG_NP: f64 = 100.0;
/// Rated nozzle pressure, master-stream smooth bore (PSI).
pub const MASTER_SMOOTH_NP: f64 = 80.0;
/// Rated nozzle pressure, master-stream fog (PSI).
pub const MASTER_FOG_NP: f64 = 100.0;

/// Rated operating pressure for a nozzle class.
#[must_use]
pub const fn required_nozzle_pressure(nozzle: &NozzleSpec) -> f64 {
    match nozzle {
        NozzleSpec::Smooth { .. } => HANDLINE_SMOOTH_NP,
        NozzleSpec::Fog { .. } => HANDLINE_FOG_NP,
        NozzleSpec::MasterSmooth { .. } => MASTER_SMOOTH_NP,
        NozzleSpec::MasterFog { .. } => MASTER_FOG_NP,
    }
}

/// Nozzle discharge at a given nozzle pressure.
///
/// # Errors
///
/// Returns a configuration error when the tip diameter or rated flow is
/// not a positive finite number.
pub fn nozzle_flow(nozzle: &NozzleSpec, pressure_psi: f64) -> PanelResult<f64> {
    match *nozzle {
        NozzleSpec::Smooth { tip_in } | NozzleSpec::MasterSmooth { tip_in } => {
            require_positive("smooth bore tip diameter", tip_in)?;
            Ok(SMOOTH_BORE_COEFFICIENT * tip_in * tip_in * pressure_psi.max(0.0).sqrt())
        }
        NozzleSpec::Fog { target_gpm } | NozzleSpec::MasterFog { target_gpm } => {
            require_positive("fog nozzle target flow", target_gpm)?;
            Ok(target_gpm)
        }
    }
}

/// Nozzle-back hydraulics for one line.
///
/// The line flows its nozzle's rated discharge scaled by the valve
/// position; `pump_psi` only decides how much pressure is left at the tip.
/// A closed valve returns all zeros without touching the friction model.
///
/// # Errors
///
/// Returns a configuration error for an invalid hose or nozzle spec on an
/// open line.
pub fn line_hydraulics<F: FrictionModel + ?Sized>(
    line: &LineConfig,
    valve_pct: f64,
    pump_psi: f64,
    friction: &F,
) -> PanelResult<LineHydraulics> {
    let opening = valve_pct.clamp(0.0, 100.0);
    if opening <= 0.0 {
        return Ok(LineHydraulics::ZERO);
    }

    validate_hose(&line.hose)?;
    let rated_np = required_nozzle_pressure(&line.nozzle);
    let flow_gpm = nozzle_flow(&line.nozzle, rated_np)? * opening / 100.0;
    let friction_loss_psi = friction.loss_psi(&line.hose, flow_gpm);

    Ok(LineHydraulics {
        flow_gpm,
        friction_loss_psi,
        nozzle_pressure_psi: (pump_psi - friction_loss_psi).max(0.0),
        required_pdp_psi: pump_discharge_pressure(PdpInputs {
            nozzle_psi: rated_np,
            hose_loss_psi: friction_loss_psi,
            appliance_loss_psi: 0.0,
            elevation_ft: 0.0,
        }),
    })
}

/// Fail-fast check of a line's static parameters.
///
/// # Errors
///
/// Returns a configuration error naming the first bad parameter.
pub fn validate_line(line: &LineConfig) -> PanelResult<()> {
    validate_hose(&line.hose)?;
    nozzle_flow(&line.nozzle, required_nozzle_pressure(&line.nozzle)).map(|_| ())
}

fn validate_hose(hose: &HoseSpec) -> PanelResult<()> {
    require_positive("hose diameter", hose.diameter_in)?;
    require_positive("hose length", hose.length_ft)?;
    require_positive("hose roughness coefficient", hose.roughness_c)
}

fn require_positive(what: &str, value: f64) -> PanelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PanelError::config(format!(
            "{what} must be a positive number, got {value}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingFriction {
        calls: Cell<usize>,
    }

    impl FrictionModel for CountingFriction {
        fn loss_psi(&self, _hose: &HoseSpec, flow_gpm: f64) -> f64 {
            self.calls.set(self.calls.get() + 1);
            flow_gpm / 10.0
        }
    }

    fn handline(nozzle: NozzleSpec) -> LineConfig {
        LineConfig {
            hose: HoseSpec {
                diameter_in: 1.75,
                length_ft: 200.0,
                roughness_c: 150.0,
            },
            nozzle,
            foam_capable: true,
        }
    }

    #[test]
    fn test_smooth_bore_one_inch() {
        let q = nozzle_flow(&NozzleSpec::Smooth { tip_in: 1.0 }, 50.0).unwrap();
        assert!((q - 210.0).abs() < 1.0, "q = {q}");
    }

    #[test]
    fn test_smooth_bore_one_and_eighth() {
        let q = nozzle_flow(&NozzleSpec::Smooth { tip_in: 1.125 }, 50.0).unwrap();
        assert!((q - 266.0).abs() < 1.0, "q = {q}");
    }

    #[test]
    fn test_master_smooth_bore() {
        let q = nozzle_flow(&NozzleSpec::MasterSmooth { tip_in: 1.375 }, 80.0).unwrap();
        assert!((q - 502.0).abs() < 1.0, "q = {q}");
    }

    #[test]
    fn test_fog_ignores_pressure() {
        for psi in [0.0, 50.0, 100.0, 300.0] {
            let q = nozzle_flow(&NozzleSpec::Fog { target_gpm: 150.0 }, psi).unwrap();
            assert!((q - 150.0).abs() < f64::EPSILON);
            let m = nozzle_flow(&NozzleSpec::MasterFog { target_gpm: 750.0 }, psi).unwrap();
            assert!((m - 750.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_invalid_tip_is_configuration_error() {
        let err = nozzle_flow(&NozzleSpec::Smooth { tip_in: 0.0 }, 50.0).unwrap_err();
        assert!(err.is_configuration());
        let err = nozzle_flow(&NozzleSpec::MasterFog { target_gpm: f64::NAN }, 50.0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_required_nozzle_pressures() {
        assert!((required_nozzle_pressure(&NozzleSpec::Smooth { tip_in: 1.0 }) - 50.0).abs() < f64::EPSILON);
        assert!((required_nozzle_pressure(&NozzleSpec::Fog { target_gpm: 1.0 }) - 100.0).abs() < f64::EPSILON);
        assert!((required_nozzle_pressure(&NozzleSpec::MasterSmooth { tip_in: 1.0 }) - 80.0).abs() < f64::EPSILON);
        assert!((required_nozzle_pressure(&NozzleSpec::MasterFog { target_gpm: 1.0 }) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_closed_valve_short_circuits() {
        let friction = CountingFriction { calls: Cell::new(0) };
        let line = handline(NozzleSpec::Fog { target_gpm: 150.0 });
        let h = line_hydraulics(&line, 0.0, 150.0, &friction).unwrap();
        assert_eq!(h, LineHydraulics::ZERO);
        assert_eq!(friction.calls.get(), 0);
    }

    #[test]
    fn test_closed_valve_skips_bad_nozzle() {
        let line = handline(NozzleSpec::Smooth { tip_in: -1.0 });
        assert!(line_hydraulics(&line, 0.0, 150.0, &HazenWilliams).is_ok());
        assert!(line_hydraulics(&line, 50.0, 150.0, &HazenWilliams).is_err());
    }

    #[test]
    fn test_open_line_with_bad_hose_is_configuration_error() {
        let mut line = handline(NozzleSpec::Fog { target_gpm: 150.0 });
        line.hose.diameter_in = 0.0;
        let friction = CountingFriction { calls: Cell::new(0) };
        let err = line_hydraulics(&line, 100.0, 150.0, &friction).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(friction.calls.get(), 0);

        line.hose.diameter_in = 1.75;
        line.hose.roughness_c = 0.0;
        assert!(line_hydraulics(&line, 100.0, 150.0, &HazenWilliams).is_err());
        assert!(line_hydraulics(&line, 0.0, 150.0, &HazenWilliams).is_ok());
    }

    #[test]
    fn test_linear_valve_model() {
        let friction = CountingFriction { calls: Cell::new(0) };
        let line = handline(NozzleSpec::Fog { target_gpm: 150.0 });
        let half = line_hydraulics(&line, 50.0, 150.0, &friction).unwrap();
        assert!((half.flow_gpm - 75.0).abs() < f64::EPSILON);
        assert_eq!(friction.calls.get(), 1);
    }

    #[test]
    fn test_required_pdp_is_np_plus_friction() {
        let friction = CountingFriction { calls: Cell::new(0) };
        let line = handline(NozzleSpec::Fog { target_gpm: 150.0 });
        let h = line_hydraulics(&line, 100.0, 160.0, &friction).unwrap();
        assert!((h.friction_loss_psi - 15.0).abs() < 1e-9);
        assert!((h.required_pdp_psi - 115.0).abs() < 1e-9);
        assert!((h.nozzle_pressure_psi - 145.0).abs() < 1e-9);
    }

    #[test]
    fn test_nozzle_pressure_never_negative() {
        let line = handline(NozzleSpec::Fog { target_gpm: 150.0 });
        let h = line_hydraulics(&line, 100.0, 10.0, &HazenWilliams).unwrap();
        assert!(h.nozzle_pressure_psi.abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_line() {
        assert!(validate_line(&handline(NozzleSpec::Fog { target_gpm: 150.0 })).is_ok());
        let mut bad = handline(NozzleSpec::Fog { target_gpm: 150.0 });
        bad.hose.roughness_c = 0.0;
        assert!(validate_line(&bad).is_err());
    }
}
