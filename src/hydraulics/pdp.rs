//! Pump discharge pressure composition.

use serde::{Deserialize, Serialize};

/// Head pressure per foot of elevation (PSI/ft).
pub const PSI_PER_FOOT: f64 = 0.434;

/// Terms of the fireground PDP equation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdpInputs {
    /// Pressure the nozzle needs (PSI).
    pub nozzle_psi: f64,
    /// Hose friction loss (PSI).
    pub hose_loss_psi: f64,
    /// Loss through wyes, siamese, standpipes (PSI).
    pub appliance_loss_psi: f64,
    /// Nozzle height above the pump (feet, negative below).
    pub elevation_ft: f64,
}

/// `PDP = NP + FL + AL ± EL`.
#[must_use]
pub fn pump_discharge_pressure(inputs: PdpInputs) -> f64 {
    inputs.nozzle_psi
        + inputs.hose_loss_psi
        + inputs.appliance_loss_psi
        + inputs.elevation_ft * PSI_PER_FOOT
}
