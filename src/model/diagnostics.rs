//! Per-tick diagnostics. Produced by every tick and never fed back in.

use serde::{Deserialize, Serialize};

use super::line::PerLine;

/// Hydraulic readings for one discharge line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LineHydraulics {
    /// Water flowing through the line (GPM).
    pub flow_gpm: f64,
    /// Hose friction loss at that flow (PSI).
    pub friction_loss_psi: f64,
    /// Pressure left at the nozzle (PSI).
    pub nozzle_pressure_psi: f64,
    /// Pump discharge pressure this line needs (PSI).
    pub required_pdp_psi: f64,
}

impl LineHydraulics {
    /// All-zero reading for a closed or dry line.
    pub const ZERO: Self = Self {
        flow_gpm: 0.0,
        friction_loss_psi: 0.0,
        nozzle_pressure_psi: 0.0,
        required_pdp_psi: 0.0,
    };
}

/// Everything a tick computed that is not panel state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Water flowing out of all discharges (GPM).
    pub total_flow_gpm: f64,
    /// Portion of the discharge flow going through foam lines (GPM).
    pub foam_flow_gpm: f64,
    /// Concentrate drawn from the foam cell (GPM).
    pub foam_concentrate_gpm: f64,
    /// Flow bypassed by the relief valve (GPM).
    pub bypass_gpm: f64,
    /// Flow through the tank fill / recirculation valve (GPM).
    pub recirc_gpm: f64,
    /// Highest required PDP over the open lines (PSI).
    pub nozzle_back_pdp_psi: f64,
    /// Engine speed needed to reach the nozzle-back target.
    pub required_rpm: f64,
    /// Pump output straight off the curve and governor (PSI).
    pub raw_pdp_psi: f64,
    /// Pump output after ceiling and derates, before the relief valve (PSI).
    pub achieved_pdp_psi: f64,
    /// Per-line readings.
    pub lines: PerLine<LineHydraulics>,
}
