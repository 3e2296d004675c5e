//! Cavitation and overpressure hose failure.
//!
//! Sustained discharge above the hose service pressure bursts a line. The
//! tracker is pure: it takes the previous overpressure duration and the
//! candidate lines, and reports the new duration plus any line lost.

use serde::{Deserialize, Serialize};

use crate::config::FailureConfig;
use crate::model::LineId;

/// Tolerance when comparing accumulated time against the burst delay.
const DURATION_EPSILON: f64 = 1e-9;

/// Cavitation: low intake pressure at high impeller speed.
#[must_use]
pub fn is_cavitating(intake_psi: f64, rpm: f64, config: &FailureConfig) -> bool {
    intake_psi < config.cavitation_intake_psi && rpm > config.cavitation_rpm
}

/// Reduce a pressure by a fractional derate.
#[must_use]
pub fn derate(pdp_psi: f64, fraction: f64) -> f64 {
    pdp_psi * (1.0 - fraction)
}

/// Panel warning while cavitating.
#[must_use]
pub fn cavitation_warning(intake_psi: f64, rpm: f64) -> String {
    format!(
        "CAVITATION: intake {intake_psi:.0} PSI at {rpm:.0} RPM. Reduce RPM or increase supply"
    )
}

/// Result of one overpressure tracking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpressureOutcome {
    /// Continuous overpressure time after this tick (s).
    pub duration_secs: f64,
    /// Line lost this tick.
    pub burst: Option<LineId>,
    /// Countdown or failure message.
    pub warning: Option<String>,
}

/// Accumulate overpressure time and burst a hose once the delay runs out.
///
/// `candidates` are the open lines with their flows; the highest flow
/// bursts, ties going to the earlier line on the panel. With nothing open
/// the timer keeps running and the next line opened fails on the next tick.
#[must_use]
pub fn track_overpressure(
    raw_pdp_psi: f64,
    previous_secs: f64,
    dt: f64,
    candidates: impl IntoIterator<Item = (LineId, f64)>,
    config: &FailureConfig,
) -> OverpressureOutcome {
    if raw_pdp_psi <= config.burst_threshold_psi {
        return OverpressureOutcome {
            duration_secs: 0.0,
            burst: None,
            warning: None,
        };
    }

    let duration_secs = previous_secs + dt;
    if duration_secs + DURATION_EPSILON < config.burst_delay_secs {
        let remaining = config.burst_delay_secs - duration_secs;
        return OverpressureOutcome {
            duration_secs,
            burst: None,
            warning: Some(format!(
                "OVERPRESSURE: {raw_pdp_psi:.0} PSI above {:.0} PSI, hose failure in {remaining:.1}s",
                config.burst_threshold_psi
            )),
        };
    }

    match highest_flow(candidates) {
        Some(line) => OverpressureOutcome {
            duration_secs: 0.0,
            burst: Some(line),
            warning: Some(format!(
                "HOSE BURST: {line} failed after {duration_secs:.1}s above {:.0} PSI",
                config.burst_threshold_psi
            )),
        },
        None => OverpressureOutcome {
            duration_secs,
            burst: None,
            warning: Some(format!(
                "OVERPRESSURE: {raw_pdp_psi:.0} PSI sustained {duration_secs:.1}s, reduce pressure before opening a line"
            )),
        },
    }
}

fn highest_flow(candidates: impl IntoIterator<Item = (LineId, f64)>) -> Option<LineId> {
    candidates
        .into_iter()
        .fold(None, |best: Option<(LineId, f64)>, (id, flow)| match best {
            Some((_, top)) if flow <= top => best,
            _ => Some((id, flow)),
        })
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> FailureConfig {
        FailureConfig::default()
    }

    #[test]
    fn test_cavitation_boundary() {
        let c = cfg();
        assert!(is_cavitating(4.9, 2001.0, &c));
        assert!(!is_cavitating(5.0, 2001.0, &c));
        assert!(!is_cavitating(4.9, 2000.0, &c));
        assert!(!is_cavitating(5.0, 2000.0, &c));
        assert!(is_cavitating(-22.0, 2200.0, &c));
    }

    #[test]
    fn test_derate() {
        assert!((derate(200.0, 0.2) - 160.0).abs() < 1e-9);
        assert!((derate(derate(200.0, 0.2), 0.15) - 136.0).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_at_threshold_resets() {
        let out = track_overpressure(400.0, 3.0, 0.5, [(LineId::Crosslay1, 150.0)], &cfg());
        assert!(out.duration_secs.abs() < f64::EPSILON);
        assert!(out.burst.is_none());
        assert!(out.warning.is_none());
    }

    #[test]
    fn test_countdown_before_burst() {
        let out = track_overpressure(420.0, 2.0, 0.5, [(LineId::Crosslay1, 150.0)], &cfg());
        assert!((out.duration_secs - 2.5).abs() < 1e-9);
        assert!(out.burst.is_none());
        assert!(out.warning.is_some_and(|w| w.contains("2.5s")));
    }

    #[test]
    fn test_burst_at_delay_picks_highest_flow() {
        let lines = [
            (LineId::Crosslay1, 150.0),
            (LineId::Discharge1, 250.0),
            (LineId::Crosslay2, 95.0),
        ];
        let out = track_overpressure(450.0, 4.5, 0.5, lines, &cfg());
        assert_eq!(out.burst, Some(LineId::Discharge1));
        assert!(out.duration_secs.abs() < f64::EPSILON);
        assert!(out.warning.is_some_and(|w| w.contains("Discharge 1")));
    }

    #[test]
    fn test_tie_goes_to_first_line() {
        let lines = [(LineId::Crosslay2, 150.0), (LineId::Crosslay3, 150.0)];
        let out = track_overpressure(450.0, 5.0, 0.0, lines, &cfg());
        assert_eq!(out.burst, Some(LineId::Crosslay2));
    }

    #[test]
    fn test_no_open_line_keeps_timing() {
        let out = track_overpressure(450.0, 4.5, 1.0, [], &cfg());
        assert!(out.burst.is_none());
        assert!((out.duration_secs - 5.5).abs() < 1e-9);
    }
}
