//! Panel data model.
//!
//! Plain records describing the apparatus and the panel. Behavior lives
//! in the hydraulics, pump, thermal, foam and failure modules; the
//! orchestrator in [`crate::step`] is the only code that assembles a new
//! [`PanelState`] during a tick.

pub mod diagnostics;
pub mod line;
pub mod panel;
pub mod warnings;

pub use diagnostics::{Diagnostics, LineHydraulics};
pub use line::{HoseSpec, LineConfig, LineId, NozzleSpec, PerLine};
pub use panel::{
    FoamSystem, Gauges, GovernorMode, Interlocks, PanelState, ReliefValve, Runtime, ThermalState,
    WaterSource,
};
pub use warnings::WarningSet;
