//! Gauge unit conversions (Poka-Yoke).
//!
//! The panel model works in plain `f64` PSI/GPM/°F for speed. Conversions
//! that cross unit systems go through `uom` so the factors are never
//! hand-typed.

use uom::si::f64::Pressure;
use uom::si::pressure::{inch_of_mercury, pound_force_per_square_inch};

/// Highest reading on the vacuum side of a compound intake gauge.
pub const VACUUM_GAUGE_MAX_INHG: f64 = 30.0;

/// Convert PSI to inches of mercury.
#[must_use]
pub fn psi_to_inhg(value_psi: f64) -> f64 {
    Pressure::new::<pound_force_per_square_inch>(value_psi).get::<inch_of_mercury>()
}

/// Convert inches of mercury to PSI.
#[must_use]
pub fn inhg_to_psi(value_inhg: f64) -> f64 {
    Pressure::new::<inch_of_mercury>(value_inhg).get::<pound_force_per_square_inch>()
}

/// Split a gauge pressure into the two faces of a compound gauge.
///
/// Returns `(psi, vacuum_inhg)`: positive pressure reads on the PSI face,
/// negative pressure reads as vacuum clamped to the gauge face.
#[must_use]
pub fn compound_reading(gauge_psi: f64) -> (f64, f64) {
    if gauge_psi >= 0.0 {
        (gauge_psi, 0.0)
    } else {
        let vacuum = psi_to_inhg(-gauge_psi).min(VACUUM_GAUGE_MAX_INHG);
        (0.0, vacuum)
    }
}
