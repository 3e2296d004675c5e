//! Around-the-pump foam proportioner.

use crate::model::{FoamSystem, LineConfig, LineHydraulics, PerLine};

/// Lowest selectable concentrate percentage.
pub const FOAM_PERCENT_MIN: f64 = 0.1;
/// Highest selectable concentrate percentage.
pub const FOAM_PERCENT_MAX: f64 = 6.0;
/// Foam cell level, as a fraction of capacity, that triggers a low warning.
pub const FOAM_LOW_FRACTION: f64 = 0.2;

/// Solution flow through lines that are foam-capable and foam-enabled.
#[must_use]
pub fn foam_flow_gpm(
    foam: &FoamSystem,
    lines: &PerLine<LineConfig>,
    hydraulics: &PerLine<LineHydraulics>,
) -> f64 {
    foam.enabled_lines
        .iter()
        .filter(|&&id| lines[id].foam_capable)
        .map(|&id| hydraulics[id].flow_gpm)
        .sum()
}

/// Concentrate injection rate for a solution flow (GPM).
#[must_use]
pub fn concentrate_gpm(foam: &FoamSystem, foam_flow_gpm: f64) -> f64 {
    foam.percent / 100.0 * foam_flow_gpm.max(0.0)
}

/// Whether the proportioner injects this tick.
#[must_use]
pub fn is_injecting(foam: &FoamSystem, engaged: bool, foam_flow_gpm: f64) -> bool {
    (foam.master_enabled || !foam.enabled_lines.is_empty())
        && engaged
        && foam_flow_gpm > 0.0
        && foam.remaining_gal > 0.0
}

/// Draw concentrate for `dt` seconds of flow.
///
/// Returns the new remaining volume, never below zero. Nothing is drawn
/// unless [`is_injecting`] holds.
#[must_use]
pub fn consume(foam: &FoamSystem, engaged: bool, foam_flow_gpm: f64, dt: f64) -> f64 {
    if !is_injecting(foam, engaged, foam_flow_gpm) {
        return foam.remaining_gal;
    }
    let used = concentrate_gpm(foam, foam_flow_gpm) * dt / 60.0;
    (foam.remaining_gal - used).max(0.0)
}

/// Clamp an operator-entered concentrate percentage.
#[must_use]
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(FOAM_PERCENT_MIN, FOAM_PERCENT_MAX)
    } else {
        FOAM_PERCENT_MIN
    }
}

/// Foam cell level warning.
#[must_use]
pub fn foam_level_warning(foam: &FoamSystem) -> Option<String> {
    if foam.remaining_gal <= 0.0 {
        Some("Foam tank empty: lines discharging plain water".to_string())
    } else if foam.remaining_gal < foam.capacity_gal * FOAM_LOW_FRACTION {
        Some(format!(
            "Foam concentrate low: {:.1} gal remaining",
            foam.remaining_gal
        ))
    } else {
        None
    }
}
