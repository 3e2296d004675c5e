//! Hose friction loss.

use crate::model::HoseSpec;

/// Friction-loss formula seam.
///
/// The orchestrator only needs "PSI lost over this lay at this flow", so
/// alternative formulas (or counting doubles in tests) plug in here.
pub trait FrictionModel {
    /// Pressure lost over the whole lay at `flow_gpm` (PSI).
    fn loss_psi(&self, hose: &HoseSpec, flow_gpm: f64) -> f64;
}

/// Hazen-Williams friction loss in US customary units.
///
/// ```text
/// P_f = 4.52 · L · Q^1.85 / (C^1.85 · d^4.87)
/// ```
///
/// with `Q` in GPM, `d` in inches, `L` in feet, `P_f` in PSI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazenWilliams;

impl HazenWilliams {
    /// Unit constant for GPM / inch / foot / PSI.
    pub const COEFFICIENT: f64 = 4.52;
    /// Flow exponent.
    pub const FLOW_EXPONENT: f64 = 1.85;
    /// Diameter exponent.
    pub const DIAMETER_EXPONENT: f64 = 4.87;
}

impl FrictionModel for HazenWilliams {
    fn loss_psi(&self, hose: &HoseSpec, flow_gpm: f64) -> f64 {
        if flow_gpm <= 0.0 {
            return 0.0;
        }
        Self::COEFFICIENT * hose.length_ft * flow_gpm.powf(Self::FLOW_EXPONENT)
            / (hose.roughness_c.powf(Self::FLOW_EXPONENT)
                * hose.diameter_in.powf(Self::DIAMETER_EXPONENT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROSSLAY: HoseSpec = HoseSpec {
        diameter_in: 1.75,
        length_ft: 200.0,
        roughness_c: 150.0,
    };

    #[test]
    fn test_zero_flow_no_loss() {
        assert!(HazenWilliams.loss_psi(&CROSSLAY, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_crosslay_at_150_gpm() {
        // Roughly 59 PSI for 200 ft of 1¾" at 150 GPM.
        let loss = HazenWilliams.loss_psi(&CROSSLAY, 150.0);
        assert!(loss > 55.0 && loss < 63.0, "loss = {loss}");
    }

    #[test]
    fn test_loss_scales_with_length() {
        let half = HoseSpec {
            length_ft: 100.0,
            ..CROSSLAY
        };
        let full = HazenWilliams.loss_psi(&CROSSLAY, 150.0);
        let partial = HazenWilliams.loss_psi(&half, 150.0);
        assert!((full - 2.0 * partial).abs() < 1e-9);
    }

    #[test]
    fn test_bigger_hose_less_loss() {
        let big = HoseSpec {
            diameter_in: 2.5,
            ..CROSSLAY
        };
        assert!(HazenWilliams.loss_psi(&big, 150.0) < HazenWilliams.loss_psi(&CROSSLAY, 150.0));
    }
}
