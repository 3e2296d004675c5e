//! Discharge relief valve (DRV).

use serde::{Deserialize, Serialize};

use crate::model::ReliefValve;

/// Bypass flow opened per PSI above the setpoint.
pub const BYPASS_GPM_PER_PSI: f64 = 4.0;
/// Largest flow the relief valve can return to the intake.
pub const MAX_BYPASS_GPM: f64 = 250.0;

/// Pressure and bypass after the relief valve acts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReliefOutcome {
    /// Discharge pressure downstream of the valve (PSI).
    pub adjusted_pdp_psi: f64,
    /// Flow dumped back to the intake (GPM).
    pub bypass_gpm: f64,
}

/// Cap discharge pressure at the relief setpoint.
///
/// A disabled valve, or pressure at or below the setpoint, passes straight
/// through with no bypass.
#[must_use]
pub fn apply_drv(relief: &ReliefValve, achieved_pdp_psi: f64) -> ReliefOutcome {
    if !relief.enabled || achieved_pdp_psi <= relief.setpoint_psi {
        return ReliefOutcome {
            adjusted_pdp_psi: achieved_pdp_psi,
            bypass_gpm: 0.0,
        };
    }

    let excess = achieved_pdp_psi - relief.setpoint_psi;
    ReliefOutcome {
        adjusted_pdp_psi: relief.setpoint_psi,
        bypass_gpm: (excess * BYPASS_GPM_PER_PSI).min(MAX_BYPASS_GPM),
    }
}

/// Warning shown while the relief valve is dumping.
#[must_use]
pub fn relief_warning(relief: &ReliefValve, outcome: &ReliefOutcome) -> Option<String> {
    (outcome.bypass_gpm > 0.0).then(|| {
        format!(
            "Relief valve open: bypassing {:.0} GPM at {:.0} PSI setpoint",
            outcome.bypass_gpm, relief.setpoint_psi
        )
    })
}
