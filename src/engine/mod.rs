//! Session driver.
//!
//! A [`PanelSession`] owns everything one trainee's panel needs between
//! ticks:
//! - the [`PanelState`] and its [`GovernorState`] (never shared)
//! - the apparatus profile and tuning tables
//! - a [`SimClock`] for elapsed time
//! - a [`JidokaGuard`] that refuses to commit a defective tick
//!
//! Operator controls edit the state between ticks. Every control clamps
//! its input; none of them can fail or panic.

pub mod clock;
pub mod jidoka;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use clock::SimClock;
pub use jidoka::{JidokaConfig, JidokaGuard};

use crate::config::PanelConfig;
use crate::error::PanelResult;
use crate::foam::clamp_percent;
use crate::model::{Diagnostics, GovernorMode, LineId, PanelState, WaterSource};
use crate::profile::Apparatus;
use crate::pump::GovernorState;
use crate::step::simulate_step;

/// Highest hydrant or relay supply pressure the panel accepts (PSI).
pub const SUPPLY_PSI_MAX: f64 = 300.0;
/// Relief valve setpoint range (PSI).
pub const RELIEF_SETPOINT_MIN_PSI: f64 = 50.0;
/// Upper end of the relief valve setpoint range (PSI).
pub const RELIEF_SETPOINT_MAX_PSI: f64 = 400.0;

/// Session time.
///
/// Fixed-point nanoseconds so accumulated time is exact across platforms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    /// Session start.
    pub const ZERO: Self = Self { nanos: 0 };

    /// Time from seconds. Negative or non-finite input saturates to zero.
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = (secs * 1_000_000_000.0).round() as u64;
        Self { nanos }
    }

    /// Time from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Seconds as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }
}

impl std::ops::Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_add(rhs.nanos),
        }
    }
}

impl std::ops::Sub for SimTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// One trainee's pump panel.
#[derive(Debug, Clone)]
pub struct PanelSession {
    state: PanelState,
    governor: GovernorState,
    apparatus: Apparatus,
    config: PanelConfig,
    clock: SimClock,
    jidoka: JidokaGuard,
    diagnostics: Diagnostics,
}

impl PanelSession {
    /// Start a session on a fresh panel.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the apparatus or tuning tables are
    /// invalid.
    pub fn new(apparatus: Apparatus, config: PanelConfig) -> PanelResult<Self> {
        apparatus.validate()?;
        config.check()?;

        let state = apparatus.initial_state();
        let governor = GovernorState::new().with_mode(state.runtime.governor_mode);
        let jidoka = JidokaGuard::from_config(&config);

        Ok(Self {
            state,
            governor,
            apparatus,
            config,
            clock: SimClock::new(),
            jidoka,
            diagnostics: Diagnostics::default(),
        })
    }

    /// Session on the built-in engine with default tuning.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in tables are themselves invalid.
    pub fn standard() -> PanelResult<Self> {
        Self::new(Apparatus::standard_engine(), PanelConfig::default())
    }

    /// Current panel state.
    #[must_use]
    pub const fn state(&self) -> &PanelState {
        &self.state
    }

    /// Current governor state.
    #[must_use]
    pub const fn governor(&self) -> &GovernorState {
        &self.governor
    }

    /// Apparatus profile.
    #[must_use]
    pub const fn apparatus(&self) -> &Apparatus {
        &self.apparatus
    }

    /// Tuning tables.
    #[must_use]
    pub const fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Diagnostics from the last committed tick.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Elapsed session time.
    #[must_use]
    pub const fn current_time(&self) -> SimTime {
        self.clock.current_time()
    }

    /// Ticks committed so far.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.clock.step_count()
    }

    /// Advance the panel by `dt` seconds.
    ///
    /// The new state is committed only if the tick succeeds and passes the
    /// Jidoka guard; otherwise the session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns an invalid-timestep, configuration or Jidoka error.
    pub fn step(&mut self, dt: f64) -> PanelResult<&Diagnostics> {
        let outcome = simulate_step(&self.state, &self.governor, dt, &self.apparatus, &self.config)?;
        self.jidoka.check(&outcome.state, &outcome.governor)?;

        self.state = outcome.state;
        self.governor = outcome.governor;
        self.diagnostics = outcome.diagnostics;
        self.clock.advance(dt);

        debug!(
            elapsed = %self.clock.current_time(),
            rpm = self.state.runtime.rpm,
            pdp_psi = self.state.gauges.discharge_psi,
            flow_gpm = self.state.gauges.flow_gpm,
            "tick"
        );
        Ok(&self.diagnostics)
    }

    /// Tick at `dt` until `duration` more seconds have elapsed.
    ///
    /// # Errors
    ///
    /// Stops at the first failing tick.
    pub fn run_for(&mut self, duration: f64, dt: f64) -> PanelResult<()> {
        let end = self.clock.current_time() + SimTime::from_secs(duration);
        for _ in 0..self.clock.steps_until(end, dt) {
            self.step(dt)?;
        }
        Ok(())
    }

    // ===== Interlocks =====

    /// Put the pump in gear.
    pub fn engage_pump(&mut self) {
        if !self.state.interlocks.pump_engaged {
            info!("pump engaged");
        }
        self.state.interlocks.pump_engaged = true;
    }

    /// Take the pump out of gear.
    pub fn disengage_pump(&mut self) {
        if self.state.interlocks.pump_engaged {
            info!("pump disengaged");
        }
        self.state.interlocks.pump_engaged = false;
    }

    /// Press or release the emergency stop.
    pub fn set_emergency_stop(&mut self, active: bool) {
        if self.state.interlocks.emergency_stop != active {
            info!(active, "emergency stop");
        }
        self.state.interlocks.emergency_stop = active;
    }

    /// Record whether the primer has done its job.
    pub fn set_primed(&mut self, primed: bool) {
        self.state.interlocks.primed = primed;
    }

    // ===== Engine and governor =====

    /// Move the hand throttle (0-100 %). Sets the RPM-mode target.
    pub fn set_throttle(&mut self, pct: f64) {
        self.state.throttle_pct = clamp_pct(pct, self.state.throttle_pct);
        self.governor = self.governor.with_throttle(self.state.throttle_pct);
    }

    /// Select a governor mode. A change clears the PID memory.
    pub fn set_governor_mode(&mut self, mode: GovernorMode) {
        self.governor = self.governor.with_mode(mode);
        self.state.runtime.governor_mode = mode;
    }

    /// Set the PRESSURE-mode target (clamped to 50-250 PSI).
    pub fn set_target_pdp(&mut self, psi: f64) {
        self.governor = self.governor.with_target_pdp(psi);
    }

    // ===== Water =====

    /// Open a discharge valve (0-100 %).
    ///
    /// Returns `false` and leaves the valve shut if the line has burst.
    pub fn set_valve(&mut self, line: LineId, pct: f64) -> bool {
        if self.state.burst_lines.contains(&line) {
            warn!(line = %line, "valve ignored: hose burst");
            return false;
        }
        self.state.valves[line] = clamp_pct(pct, self.state.valves[line]);
        true
    }

    /// Select the water source.
    pub fn set_source(&mut self, source: WaterSource) {
        self.state.source = source;
    }

    /// Set the hydrant or relay supply pressure; `None` restores the default.
    pub fn set_supply_psi(&mut self, psi: Option<f64>) {
        self.state.supply_psi = psi
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, SUPPLY_PSI_MAX));
    }

    /// Open or close the tank-to-pump valve.
    pub fn set_tank_to_pump(&mut self, open: bool) {
        self.state.tank_to_pump_open = open;
    }

    /// Set the tank fill / recirculation valve (0-100 %).
    pub fn set_recirculation(&mut self, pct: f64) {
        self.state.recirc_pct = clamp_pct(pct, self.state.recirc_pct);
    }

    // ===== Foam =====

    /// Switch the proportioner on or off.
    pub fn set_foam_master(&mut self, enabled: bool) {
        self.state.foam.master_enabled = enabled;
    }

    /// Switch foam on a line.
    ///
    /// Returns `false` if the line is not plumbed for foam.
    pub fn set_foam_line(&mut self, line: LineId, enabled: bool) -> bool {
        if enabled && !self.apparatus.line(line).foam_capable {
            return false;
        }
        if enabled {
            self.state.foam.enabled_lines.insert(line);
        } else {
            self.state.foam.enabled_lines.remove(&line);
        }
        true
    }

    /// Set the concentrate percentage (0.1-6 %).
    pub fn set_foam_percent(&mut self, percent: f64) {
        self.state.foam.percent = clamp_percent(percent);
    }

    /// Top the foam cell up to capacity.
    pub fn refill_foam(&mut self) {
        self.state.foam.remaining_gal = self.state.foam.capacity_gal;
    }

    // ===== Relief valve =====

    /// Arm or disarm the relief valve and set its opening pressure.
    pub fn set_relief(&mut self, enabled: bool, setpoint_psi: f64) {
        self.state.relief.enabled = enabled;
        if setpoint_psi.is_finite() {
            self.state.relief.setpoint_psi =
                setpoint_psi.clamp(RELIEF_SETPOINT_MIN_PSI, RELIEF_SETPOINT_MAX_PSI);
        }
    }
}

fn clamp_pct(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}
