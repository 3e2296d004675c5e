//! # pumpsim
//!
//! Deterministic simulation core for a fire-apparatus pump operator's
//! panel, built for training.
//!
//! Each call to [`step::simulate_step`] takes the current panel state, the
//! governor state and a time step, and returns the next state with gauge
//! readings, diagnostics and operator warnings:
//! - nozzle, hose friction and pump-discharge-pressure hydraulics
//! - the NFPA pump curve scaled by engine speed
//! - a PID pressure governor with RPM and PRESSURE modes
//! - pump and engine heating, foam proportioning, and the relief valve
//! - cavitation, sustained overpressure and hose bursts
//!
//! Physical extremes never fail a tick. They are clamped and reported as
//! warnings; errors are reserved for bad configuration and a defective
//! state caught by the Jidoka guard.
//!
//! ## Example
//!
//! ```rust
//! use pumpsim::prelude::*;
//!
//! let mut session = PanelSession::standard().unwrap();
//! session.engage_pump();
//! session.set_valve(LineId::Crosslay1, 100.0);
//! session.run_for(5.0, 0.1).unwrap();
//!
//! assert!(session.state().gauges.flow_gpm > 0.0);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Hydraulic formulas are written as published
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod cli;
pub mod config;
pub mod drill;
pub mod engine;
pub mod error;
pub mod failure;
pub mod foam;
pub mod hydraulics;
pub mod model;
pub mod profile;
pub mod pump;
pub mod step;
pub mod thermal;
pub mod units;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{PanelConfig, PanelConfigBuilder};
    pub use crate::drill::{Drill, DrillAction, DrillTrace};
    pub use crate::engine::{JidokaGuard, PanelSession, SimClock, SimTime};
    pub use crate::error::{PanelError, PanelResult};
    pub use crate::model::{
        Diagnostics, GovernorMode, LineId, PanelState, PerLine, WarningSet, WaterSource,
    };
    pub use crate::profile::Apparatus;
    pub use crate::pump::GovernorState;
    pub use crate::step::{simulate_step, StepOutcome};
}

/// Re-export for public API
pub use error::{PanelError, PanelResult};
