//! NFPA acceptance curve for a single-stage centrifugal pump.
//!
//! # Governing Equations
//!
//! ```text
//! Affinity laws:  Q ∝ N,  P ∝ N²
//! Max PDP:        P(Q, N) = P_curve(Q / max(N/N_rated, 0.1)) · (N/N_rated)² + P_intake
//! Inverse:        N = N_rated · √((P_target − P_intake) / P_curve(Q))
//! ```

use serde::{Deserialize, Serialize};

/// Speed the curve was measured at.
pub const RATED_RPM: f64 = 2200.0;

/// Rated capacity (GPM at 150 PSI).
pub const RATED_CAPACITY_GPM: f64 = 1500.0;

/// `(flow GPM, net pressure PSI)` at rated speed.
pub const NFPA_CURVE: [(f64, f64); 6] = [
    (0.0, 290.0),
    (750.0, 250.0),
    (1050.0, 200.0),
    (1500.0, 150.0),
    (1875.0, 125.0),
    (2250.0, 95.0),
];

/// Smallest speed ratio used when mapping flow back to rated speed.
const MIN_RPM_FACTOR: f64 = 0.1;

/// Bounds on the speed returned by [`calculate_required_rpm`].
pub const REQUIRED_RPM_MIN: f64 = 600.0;
/// Upper bound on the speed returned by [`calculate_required_rpm`].
pub const REQUIRED_RPM_MAX: f64 = 3000.0;

/// Net pump pressure at rated speed, linearly interpolated.
///
/// Flows outside the curve clamp to its endpoints.
#[must_use]
pub fn curve_pressure(flow_gpm: f64) -> f64 {
    let (first_q, first_p) = NFPA_CURVE[0];
    let (last_q, last_p) = NFPA_CURVE[NFPA_CURVE.len() - 1];

    if flow_gpm <= first_q {
        return first_p;
    }
    if flow_gpm >= last_q {
        return last_p;
    }

    for pair in NFPA_CURVE.windows(2) {
        let (q0, p0) = pair[0];
        let (q1, p1) = pair[1];
        if flow_gpm <= q1 {
            let t = (flow_gpm - q0) / (q1 - q0);
            return p0 + t * (p1 - p0);
        }
    }

    last_p
}

/// Highest discharge pressure the pump can make at this flow and speed.
#[must_use]
pub fn calculate_max_pdp(flow_gpm: f64, rpm: f64, intake_psi: f64) -> f64 {
    let rpm_factor = rpm / RATED_RPM;
    let effective_flow = flow_gpm / rpm_factor.max(MIN_RPM_FACTOR);
    let net = curve_pressure(effective_flow) * rpm_factor * rpm_factor;
    (net + intake_psi).max(0.0)
}

/// Engine speed needed to reach `target_pdp_psi` at this flow.
#[must_use]
pub fn calculate_required_rpm(flow_gpm: f64, target_pdp_psi: f64, intake_psi: f64) -> f64 {
    let base = curve_pressure(flow_gpm);
    let net = target_pdp_psi - intake_psi;
    if net <= 0.0 || base <= 0.0 {
        return REQUIRED_RPM_MIN;
    }
    (RATED_RPM * (net / base).sqrt()).clamp(REQUIRED_RPM_MIN, REQUIRED_RPM_MAX)
}

/// Where the operating point sits relative to rated capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunoutStatus {
    /// At or below 125 % of rated capacity.
    Normal,
    /// Above 125 % of rated capacity.
    HighFlow,
    /// At or above 150 % of rated capacity.
    Runout,
}

/// Classify a flow against rated capacity. Advisory only.
#[must_use]
pub fn runout_status(flow_gpm: f64) -> RunoutStatus {
    if flow_gpm >= RATED_CAPACITY_GPM * 1.5 {
        RunoutStatus::Runout
    } else if flow_gpm > RATED_CAPACITY_GPM * 1.25 {
        RunoutStatus::HighFlow
    } else {
        RunoutStatus::Normal
    }
}

/// Panel warning for a runout status, if any.
#[must_use]
pub fn runout_warning(flow_gpm: f64) -> Option<String> {
    match runout_status(flow_gpm) {
        RunoutStatus::Normal => None,
        RunoutStatus::HighFlow => Some(format!(
            "High flow: {flow_gpm:.0} GPM exceeds 125% of rated capacity"
        )),
        RunoutStatus::Runout => Some(format!(
            "PUMP RUNOUT: {flow_gpm:.0} GPM at or beyond 150% of rated capacity. Close discharges"
        )),
    }
}
