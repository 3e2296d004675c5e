//! Scripted training drills.
//!
//! A drill is a YAML document: a tick size, a duration, optional tuning
//! overrides and a timeline of operator actions. Running it replays the
//! timeline through a fresh [`PanelSession`] and records a trace that
//! serializes to JSON.
//!
//! ```yaml
//! name: Hydrant hookup
//! dt: 0.5
//! duration_secs: 30
//! actions:
//!   - at: 0
//!     action: engage_pump
//!   - at: 2
//!     action: set_source
//!     source: hydrant
//!   - at: 3
//!     action: set_valve
//!     line: crosslay1
//!     pct: 100
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::config::PanelConfig;
use crate::engine::{PanelSession, SimClock, SimTime};
use crate::error::{PanelError, PanelResult};
use crate::model::{GovernorMode, LineId, WaterSource};
use crate::profile::Apparatus;

/// Slack when deciding whether an action is due on a tick (s).
const ACTION_TIME_EPSILON: f64 = 1e-9;

/// One operator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DrillAction {
    /// Put the pump in gear.
    EngagePump,
    /// Take the pump out of gear.
    DisengagePump,
    /// Press or release the emergency stop.
    EmergencyStop {
        /// Pressed.
        active: bool,
    },
    /// Primer result.
    SetPrimed {
        /// Primed.
        primed: bool,
    },
    /// Hand throttle.
    SetThrottle {
        /// Position (0-100 %).
        pct: f64,
    },
    /// Discharge valve.
    SetValve {
        /// Line.
        line: LineId,
        /// Opening (0-100 %).
        pct: f64,
    },
    /// Water source.
    SetSource {
        /// Source.
        source: WaterSource,
    },
    /// Hydrant or relay supply pressure.
    SetSupplyPsi {
        /// Pressure, or `null` for the source default.
        psi: Option<f64>,
    },
    /// Tank-to-pump valve.
    SetTankToPump {
        /// Open.
        open: bool,
    },
    /// Tank fill / recirculation valve.
    SetRecirculation {
        /// Opening (0-100 %).
        pct: f64,
    },
    /// Governor mode.
    SetGovernorMode {
        /// Mode.
        mode: GovernorMode,
    },
    /// PRESSURE-mode target.
    SetTargetPdp {
        /// Target (PSI).
        psi: f64,
    },
    /// Foam master switch.
    SetFoamMaster {
        /// On.
        enabled: bool,
    },
    /// Foam on one line.
    SetFoamLine {
        /// Line.
        line: LineId,
        /// On.
        enabled: bool,
    },
    /// Concentrate percentage.
    SetFoamPercent {
        /// Percent of solution.
        percent: f64,
    },
    /// Refill the foam cell.
    RefillFoam,
    /// Relief valve.
    SetRelief {
        /// Armed.
        enabled: bool,
        /// Opening pressure (PSI).
        setpoint_psi: f64,
    },
}

impl DrillAction {
    /// Apply to a session.
    pub fn apply(&self, session: &mut PanelSession) {
        match *self {
            Self::EngagePump => session.engage_pump(),
            Self::DisengagePump => session.disengage_pump(),
            Self::EmergencyStop { active } => session.set_emergency_stop(active),
            Self::SetPrimed { primed } => session.set_primed(primed),
            Self::SetThrottle { pct } => session.set_throttle(pct),
            Self::SetValve { line, pct } => {
                session.set_valve(line, pct);
            }
            Self::SetSource { source } => session.set_source(source),
            Self::SetSupplyPsi { psi } => session.set_supply_psi(psi),
            Self::SetTankToPump { open } => session.set_tank_to_pump(open),
            Self::SetRecirculation { pct } => session.set_recirculation(pct),
            Self::SetGovernorMode { mode } => session.set_governor_mode(mode),
            Self::SetTargetPdp { psi } => session.set_target_pdp(psi),
            Self::SetFoamMaster { enabled } => session.set_foam_master(enabled),
            Self::SetFoamLine { line, enabled } => {
                session.set_foam_line(line, enabled);
            }
            Self::SetFoamPercent { percent } => session.set_foam_percent(percent),
            Self::RefillFoam => session.refill_foam(),
            Self::SetRelief {
                enabled,
                setpoint_psi,
            } => session.set_relief(enabled, setpoint_psi),
        }
    }
}

/// An action pinned to a drill time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    /// Drill time the action happens at (s). No later than the start of
    /// the drill's last tick.
    pub at: f64,
    /// What the operator does.
    #[serde(flatten)]
    pub action: DrillAction,
}

/// A scripted drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    /// Display name.
    pub name: String,
    /// Tick size (s).
    pub dt: f64,
    /// Drill length (s).
    pub duration_secs: f64,
    /// Record a frame every this many ticks.
    #[serde(default = "default_record_every")]
    pub record_every: u64,
    /// Tuning overrides.
    #[serde(default)]
    pub config: Option<PanelConfig>,
    /// Operator timeline.
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

const fn default_record_every() -> u64 {
    1
}

impl Drill {
    /// Parse and check a drill.
    ///
    /// # Errors
    ///
    /// Returns a parse or configuration error.
    pub fn from_yaml(yaml: &str) -> PanelResult<Self> {
        let drill: Self = serde_yaml::from_str(yaml)?;
        drill.check()?;
        Ok(drill)
    }

    /// Load and check a drill file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse or configuration error.
    pub fn load<P: AsRef<Path>>(path: P) -> PanelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Fail-fast checks on timing and overrides.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first problem.
    pub fn check(&self) -> PanelResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(PanelError::config(format!(
                "drill dt must be a positive number, got {}",
                self.dt
            )));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(PanelError::config(format!(
                "drill duration_secs must be a non-negative number, got {}",
                self.duration_secs
            )));
        }
        if self.record_every == 0 {
            return Err(PanelError::config("drill record_every must be at least 1"));
        }
        // An action applies before the first tick starting at or after it, so
        // anything later than the last tick's start would never run.
        let last_start = self.ticks().checked_sub(1).map(|n| n as f64 * self.dt);
        if let Some(bad) = self.actions.iter().find(|a| {
            !a.at.is_finite()
                || a.at < 0.0
                || !last_start.is_some_and(|last| a.at <= last + ACTION_TIME_EPSILON)
        }) {
            return Err(PanelError::config(match last_start {
                Some(last) => format!(
                    "action at {}s falls outside the drill: the last tick starts at {last}s",
                    bad.at
                ),
                None => format!("action at {}s falls outside the drill: it has no ticks", bad.at),
            }));
        }
        if let Some(config) = &self.config {
            config.check()?;
        }
        Ok(())
    }

    fn ticks(&self) -> u64 {
        SimClock::new().steps_until(SimTime::from_secs(self.duration_secs), self.dt)
    }

    /// Replay the drill on a fresh panel.
    ///
    /// Actions due at or before a tick's start time are applied before
    /// that tick, in timeline order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error or the first failing tick.
    pub fn run(&self, apparatus: &Apparatus) -> PanelResult<DrillTrace> {
        self.check()?;
        let config = self.config.clone().unwrap_or_default();
        let mut session = PanelSession::new(apparatus.clone(), config)?;

        let mut timeline = self.actions.clone();
        timeline.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut pending = timeline.iter().peekable();

        let ticks = self.ticks();
        let foam_start = session.state().foam.remaining_gal;
        let water_start = session.state().water_tank_gal;
        let mut summary = DrillSummary::default();
        let mut frames = vec![Frame::capture(&session)];

        info!(drill = %self.name, ticks, "drill started");
        for tick in 1..=ticks {
            let now = session.current_time().as_secs_f64();
            while let Some(scheduled) = pending.next_if(|a| a.at <= now + ACTION_TIME_EPSILON) {
                scheduled.action.apply(&mut session);
            }

            let diagnostics = session.step(self.dt)?;
            summary.peak_raw_pdp_psi = summary.peak_raw_pdp_psi.max(diagnostics.raw_pdp_psi);
            summary.water_flowed_gal += diagnostics.total_flow_gpm * self.dt / 60.0;

            let state = session.state();
            summary.peak_discharge_psi = summary.peak_discharge_psi.max(state.gauges.discharge_psi);
            summary.peak_pump_temp_f = summary.peak_pump_temp_f.max(state.thermal.pump_temp_f);
            if state.cavitating {
                summary.cavitation_secs += self.dt;
            }

            if tick % self.record_every == 0 || tick == ticks {
                frames.push(Frame::capture(&session));
            }
        }

        let state = session.state();
        summary.foam_used_gal = foam_start - state.foam.remaining_gal;
        summary.tank_change_gal = state.water_tank_gal - water_start;
        summary.burst_lines = state.burst_lines.clone();
        info!(drill = %self.name, bursts = summary.burst_lines.len(), "drill finished");

        Ok(DrillTrace {
            name: self.name.clone(),
            dt: self.dt,
            frames,
            summary,
        })
    }
}

/// Snapshot of the panel after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Drill time (s).
    pub t: f64,
    /// Engine speed.
    pub rpm: f64,
    /// Governor mode.
    pub governor_mode: GovernorMode,
    /// Intake gauge, pressure face (PSI).
    pub intake_psi: f64,
    /// Intake gauge, vacuum face (inHg).
    pub vacuum_inhg: f64,
    /// Master discharge gauge (PSI).
    pub discharge_psi: f64,
    /// Flowmeter (GPM).
    pub flow_gpm: f64,
    /// Relief valve bypass (GPM).
    pub bypass_gpm: f64,
    /// Booster tank (gallons).
    pub water_tank_gal: f64,
    /// Foam cell (gallons).
    pub foam_remaining_gal: f64,
    /// Pump casing temperature (°F).
    pub pump_temp_f: f64,
    /// Engine coolant temperature (°F).
    pub engine_temp_f: f64,
    /// Cavitating.
    pub cavitating: bool,
    /// Panel warnings.
    pub warnings: Vec<String>,
    /// Lines lost so far.
    pub burst_lines: BTreeSet<LineId>,
}

impl Frame {
    /// Capture the session's current readings.
    #[must_use]
    pub fn capture(session: &PanelSession) -> Self {
        let state = session.state();
        Self {
            t: session.current_time().as_secs_f64(),
            rpm: state.runtime.rpm,
            governor_mode: state.runtime.governor_mode,
            intake_psi: state.gauges.intake_psi,
            vacuum_inhg: state.gauges.vacuum_inhg,
            discharge_psi: state.gauges.discharge_psi,
            flow_gpm: state.gauges.flow_gpm,
            bypass_gpm: state.relief.bypass_gpm,
            water_tank_gal: state.water_tank_gal,
            foam_remaining_gal: state.foam.remaining_gal,
            pump_temp_f: state.thermal.pump_temp_f,
            engine_temp_f: state.thermal.engine_temp_f,
            cavitating: state.cavitating,
            warnings: state.warnings.to_vec(),
            burst_lines: state.burst_lines.clone(),
        }
    }
}

/// Whole-drill figures for grading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrillSummary {
    /// Highest discharge gauge reading (PSI).
    pub peak_discharge_psi: f64,
    /// Highest pressure the pump developed before limiting (PSI).
    pub peak_raw_pdp_psi: f64,
    /// Hottest the pump casing got (°F).
    pub peak_pump_temp_f: f64,
    /// Time spent cavitating (s).
    pub cavitation_secs: f64,
    /// Water discharged through lines (gallons).
    pub water_flowed_gal: f64,
    /// Net booster tank change (gallons).
    pub tank_change_gal: f64,
    /// Foam concentrate used (gallons).
    pub foam_used_gal: f64,
    /// Lines lost.
    pub burst_lines: BTreeSet<LineId>,
}

/// Recorded drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillTrace {
    /// Drill name.
    pub name: String,
    /// Tick size (s).
    pub dt: f64,
    /// Frames, starting with the untouched panel at t = 0.
    pub frames: Vec<Frame>,
    /// Totals.
    pub summary: DrillSummary,
}

impl DrillTrace {
    /// Serialize as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> PanelResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Last recorded frame.
    #[must_use]
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }
}
