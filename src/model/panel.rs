//! Panel state: everything the operator has set plus the last tick's readings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::line::{LineId, PerLine};
use super::warnings::WarningSet;

/// Where the pump is taking water from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterSource {
    /// Onboard booster tank.
    #[default]
    Tank,
    /// Pressurized hydrant supply.
    Hydrant,
    /// Drafting from a static source through hard suction.
    Draft,
    /// Supply line from another pumper.
    Relay,
}

impl WaterSource {
    /// Whether the supply arrives under pressure (can refill the tank).
    #[must_use]
    pub const fn is_pressurized(self) -> bool {
        matches!(self, Self::Hydrant | Self::Relay)
    }
}

/// Governor control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernorMode {
    /// Hold an operator-set engine speed.
    Rpm,
    /// Hold a target discharge pressure.
    #[default]
    Pressure,
}

impl std::fmt::Display for GovernorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rpm => f.write_str("RPM"),
            Self::Pressure => f.write_str("PRESSURE"),
        }
    }
}

/// Safety interlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interlocks {
    /// Pump transmission engaged.
    pub pump_engaged: bool,
    /// Pump primed (only meaningful when drafting).
    pub primed: bool,
    /// Emergency stop pressed.
    pub emergency_stop: bool,
}

/// Engine runtime readings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Runtime {
    /// Engine speed.
    pub rpm: f64,
    /// Governor mode shown on the panel.
    pub governor_mode: GovernorMode,
}

/// Discharge relief valve settings and last bypass flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliefValve {
    /// Relief valve armed.
    pub enabled: bool,
    /// Opening pressure (PSI).
    pub setpoint_psi: f64,
    /// Flow bypassed back to the intake on the last tick (GPM).
    pub bypass_gpm: f64,
}

/// Instrument readings from the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gauges {
    /// Compound intake gauge, pressure side (PSI, never negative).
    pub intake_psi: f64,
    /// Compound intake gauge, vacuum side (inHg).
    pub vacuum_inhg: f64,
    /// Master discharge gauge (PSI).
    pub discharge_psi: f64,
    /// Flowmeter total (GPM).
    pub flow_gpm: f64,
}

/// Pump and engine temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    /// Water temperature in the pump casing (°F).
    pub pump_temp_f: f64,
    /// Engine coolant temperature (°F).
    pub engine_temp_f: f64,
}

impl Default for ThermalState {
    fn default() -> Self {
        Self {
            pump_temp_f: 70.0,
            engine_temp_f: 160.0,
        }
    }
}

/// Foam proportioning system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoamSystem {
    /// Lines with foam switched on at the panel.
    pub enabled_lines: BTreeSet<LineId>,
    /// Concentrate injection rate (percent of solution).
    pub percent: f64,
    /// Concentrate left in the foam cell (gallons).
    pub remaining_gal: f64,
    /// Foam cell capacity (gallons).
    pub capacity_gal: f64,
    /// Proportioner master switch.
    pub master_enabled: bool,
}

impl Default for FoamSystem {
    fn default() -> Self {
        Self {
            enabled_lines: BTreeSet::new(),
            percent: 0.6,
            remaining_gal: 30.0,
            capacity_gal: 30.0,
            master_enabled: false,
        }
    }
}

/// Complete panel state for one training session.
///
/// Only [`simulate_step`](crate::step::simulate_step) produces new
/// values of this type during a run; controls on
/// [`PanelSession`](crate::engine::PanelSession) edit the operator-set
/// fields between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    /// Hand throttle position (0-100 %). Moves to the adopted speed when
    /// the governor auto-switches into RPM mode.
    pub throttle_pct: f64,
    /// Selected water source.
    pub source: WaterSource,
    /// Explicit hydrant/relay supply pressure; `None` uses the source default.
    pub supply_psi: Option<f64>,
    /// Discharge valve openness per line (0-100 %).
    pub valves: PerLine<f64>,
    /// Tank-to-pump valve open.
    pub tank_to_pump_open: bool,
    /// Tank fill / recirculation valve openness (0-100 %).
    pub recirc_pct: f64,
    /// Foam proportioner.
    pub foam: FoamSystem,
    /// Water left in the booster tank (gallons).
    pub water_tank_gal: f64,
    /// Booster tank capacity (gallons).
    pub water_tank_capacity_gal: f64,
    /// Safety interlocks.
    pub interlocks: Interlocks,
    /// Engine runtime readings.
    pub runtime: Runtime,
    /// Discharge relief valve.
    pub relief: ReliefValve,
    /// Instrument readings.
    pub gauges: Gauges,
    /// Pump and engine temperatures.
    pub thermal: ThermalState,
    /// Warnings raised by the last tick.
    pub warnings: WarningSet,
    /// Pump cavitating on the last tick.
    pub cavitating: bool,
    /// Seconds of continuous overpressure.
    pub overpressure_secs: f64,
    /// Lines lost to hose failure. Never shrinks during a session.
    pub burst_lines: BTreeSet<LineId>,
}

impl PanelState {
    /// Whether a line's discharge valve is open at all.
    #[must_use]
    pub fn is_open(&self, line: LineId) -> bool {
        self.valves[line] > 0.0
    }

    /// Lines with an open discharge valve, in panel order.
    pub fn open_lines(&self) -> impl Iterator<Item = LineId> + '_ {
        LineId::ALL.into_iter().filter(|&id| self.is_open(id))
    }

    /// Whether the pump is allowed to move water this tick.
    #[must_use]
    pub const fn is_pumping(&self) -> bool {
        self.interlocks.pump_engaged && !self.interlocks.emergency_stop
    }
}
