//! Fire pump: performance curve, governor, relief valve and gauges.

pub mod curve;
pub mod gauges;
pub mod governor;
pub mod relief;

pub use curve::{
    calculate_max_pdp, calculate_required_rpm, curve_pressure, runout_status, runout_warning,
    RunoutStatus, RATED_CAPACITY_GPM, RATED_RPM,
};
pub use gauges::{discharge_gauge, intake_gauge, DischargeReading, IntakeReading, IntakeSupply};
pub use governor::{
    auto_switch_mode, governor_warnings, rpm_to_throttle, throttle_to_rpm, validate_governor_mode,
    GovernorOutput, GovernorState, ModeValidation,
};
pub use relief::{apply_drv, relief_warning, ReliefOutcome};
