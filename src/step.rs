//! One simulation tick.
//!
//! [`simulate_step`] is a pure function of the previous panel state, the
//! session's governor state and the elapsed time. It performs no I/O and
//! never blocks; the caller decides when to tick. Stages run in a fixed
//! order:
//!
//! 1. interlock gate (disengaged or e-stop returns a safe idle state)
//! 2. nozzle-back demand per open line
//! 3. intake pressure from the water source
//! 4. governor and pump curve, clamped to the safety ceiling
//! 5. cavitation derate and loss of water supply
//! 6. discharge relief valve
//! 7. overpressure and hose failure
//! 8. recirculation and booster tank level
//! 9. pump and engine temperatures, drafting-overheat derate
//! 10. per-line display values and foam consumption
//! 11. governor auto-switch and warning aggregation

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PanelConfig;
use crate::error::{PanelError, PanelResult};
use crate::failure::{cavitation_warning, derate, is_cavitating, track_overpressure};
use crate::foam;
use crate::hydraulics::{line_hydraulics, required_nozzle_pressure, FrictionModel, HazenWilliams};
use crate::model::{
    Diagnostics, Gauges, GovernorMode, LineHydraulics, PanelState, PerLine, WarningSet, WaterSource,
};
use crate::profile::{Apparatus, IDLE_RPM};
use crate::pump::{
    apply_drv, calculate_max_pdp, calculate_required_rpm, discharge_gauge, governor_warnings,
    intake_gauge, relief_warning, rpm_to_throttle, runout_warning, validate_governor_mode,
    GovernorState, IntakeSupply,
};
use crate::thermal::{
    engine_overheating, pump_overheating, recirculation_gpm, thermal_warnings, update_thermal,
    ThermalInputs,
};

/// How far below its rated pressure a nozzle may run before the panel warns (PSI).
pub const NOZZLE_UNDERPRESSURE_MARGIN_PSI: f64 = 10.0;
/// Booster tank level, as a fraction of capacity, that triggers a low warning.
pub const WATER_LOW_FRACTION: f64 = 0.25;

/// Everything a tick produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Panel state after the tick.
    pub state: PanelState,
    /// Governor memory after the tick.
    pub governor: GovernorState,
    /// Per-tick numbers for display. Not carried forward.
    pub diagnostics: Diagnostics,
}

/// Advance the panel by `dt` seconds using Hazen-Williams friction loss.
///
/// # Errors
///
/// Returns [`PanelError::InvalidTimestep`] for a negative or non-finite
/// `dt`, and a configuration error if an open line has a bad nozzle.
pub fn simulate_step(
    state: &PanelState,
    governor: &GovernorState,
    dt: f64,
    apparatus: &Apparatus,
    config: &PanelConfig,
) -> PanelResult<StepOutcome> {
    simulate_step_with(state, governor, dt, apparatus, config, &HazenWilliams)
}

/// Advance the panel by `dt` seconds with a caller-supplied friction model.
///
/// # Errors
///
/// Same as [`simulate_step`].
pub fn simulate_step_with<F: FrictionModel + ?Sized>(
    state: &PanelState,
    governor: &GovernorState,
    dt: f64,
    apparatus: &Apparatus,
    config: &PanelConfig,
    friction: &F,
) -> PanelResult<StepOutcome> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(PanelError::InvalidTimestep { dt });
    }

    let mut next = state.clone();
    for &line in &state.burst_lines {
        next.valves[line] = 0.0;
    }

    let supply = IntakeSupply {
        source: state.source,
        supply_psi: state.supply_psi,
        tank_to_pump_open: state.tank_to_pump_open,
        tank_gal: state.water_tank_gal,
        primed: state.interlocks.primed,
    };

    // 1. Interlock gate.
    if !state.is_pumping() {
        return Ok(idle_step(next, *governor, supply, dt, config));
    }

    // 2. Nozzle-back demand.
    let mut lines = PerLine::<LineHydraulics>::default();
    for id in next.open_lines() {
        lines[id] = line_hydraulics(apparatus.line(id), next.valves[id], 0.0, friction)?;
    }
    let nozzle_back_pdp_psi = lines
        .values()
        .iter()
        .map(|h| h.required_pdp_psi)
        .fold(0.0, f64::max);
    let requested_flow_gpm: f64 = lines.values().iter().map(|h| h.flow_gpm).sum();

    // 3. Intake.
    let intake_psi = supply.intake_psi();
    let has_water = supply.has_water();

    // 4. Governor and pump curve.
    let governed = governor.update(state.runtime.rpm, state.gauges.discharge_psi, dt, &config.governor);
    let rpm = governed.rpm;
    let mut governor_state = governed.state;

    let mut raw_pdp_psi = calculate_max_pdp(requested_flow_gpm, rpm, intake_psi);
    let mut achieved_pdp_psi = raw_pdp_psi.min(config.failure.pdp_ceiling_psi);

    // 5. Cavitation and supply loss.
    let cavitating = is_cavitating(intake_psi, rpm, &config.failure);
    if cavitating {
        achieved_pdp_psi = derate(achieved_pdp_psi, config.failure.cavitation_derate);
        if !state.cavitating {
            warn!(intake_psi, rpm, "pump cavitating");
        }
    }
    if !has_water {
        lines = PerLine::default();
        raw_pdp_psi = 0.0;
        achieved_pdp_psi = 0.0;
    }

    // 6. Relief valve.
    let relief = apply_drv(&state.relief, achieved_pdp_psi);
    let mut discharge_psi = relief.adjusted_pdp_psi;
    next.relief.bypass_gpm = relief.bypass_gpm;

    // 7. Overpressure.
    let candidates: Vec<_> = next
        .open_lines()
        .map(|id| (id, lines[id].flow_gpm))
        .collect();
    let overpressure = track_overpressure(
        raw_pdp_psi,
        state.overpressure_secs,
        dt,
        candidates,
        &config.failure,
    );
    next.overpressure_secs = overpressure.duration_secs;
    if let Some(line) = overpressure.burst {
        warn!(line = %line, pdp_psi = raw_pdp_psi, "hose burst");
        next.burst_lines.insert(line);
        next.valves[line] = 0.0;
        lines[line] = LineHydraulics::ZERO;
    }
    let discharge_flow_gpm: f64 = lines.values().iter().map(|h| h.flow_gpm).sum();

    // 8. Recirculation and tank.
    let recirc_gpm = if has_water {
        recirculation_gpm(state.recirc_pct, &config.thermal)
    } else {
        0.0
    };
    next.water_tank_gal = match state.source {
        WaterSource::Tank => (state.water_tank_gal - discharge_flow_gpm * dt / 60.0).max(0.0),
        _ if has_water => {
            (state.water_tank_gal + recirc_gpm * dt / 60.0).min(state.water_tank_capacity_gal)
        }
        _ => state.water_tank_gal,
    };

    // 9. Thermal.
    next.thermal = update_thermal(
        &state.thermal,
        ThermalInputs {
            engaged: true,
            cooling_flow_gpm: discharge_flow_gpm + recirc_gpm,
            rpm,
        },
        dt,
        &config.thermal,
    );
    let overheating =
        pump_overheating(&next.thermal, &config.thermal) || engine_overheating(&next.thermal, &config.thermal);
    if state.source == WaterSource::Draft && overheating {
        achieved_pdp_psi = derate(achieved_pdp_psi, config.failure.draft_overheat_derate);
        discharge_psi = derate(discharge_psi, config.failure.draft_overheat_derate);
    }

    // 10. Display values and foam.
    if has_water {
        for id in next.open_lines() {
            lines[id] = line_hydraulics(apparatus.line(id), next.valves[id], discharge_psi, friction)?;
        }
    }
    let foam_flow_gpm = foam::foam_flow_gpm(&state.foam, &apparatus.lines, &lines);
    let foam_concentrate_gpm = if foam::is_injecting(&state.foam, true, foam_flow_gpm) {
        foam::concentrate_gpm(&state.foam, foam_flow_gpm)
    } else {
        0.0
    };
    next.foam.remaining_gal = foam::consume(&state.foam, true, foam_flow_gpm, dt);
    if state.foam.remaining_gal > 0.0 && next.foam.remaining_gal <= 0.0 {
        warn!("foam concentrate exhausted");
    }

    let intake = intake_gauge(state.source, intake_psi, state.tank_to_pump_open, state.interlocks.primed);
    let discharge = discharge_gauge(discharge_psi);
    next.gauges = Gauges {
        intake_psi: intake.psi,
        vacuum_inhg: intake.vacuum_inhg,
        discharge_psi: discharge.psi,
        flow_gpm: discharge_flow_gpm,
    };
    next.runtime.rpm = rpm;
    next.cavitating = cavitating;

    // 11. Auto-switch, then warnings.
    if config.governor.auto_switch {
        let drafting = state.source == WaterSource::Draft;
        let (switched_state, switched) =
            governor_state.auto_switch(discharge.psi, rpm, drafting, &config.governor);
        governor_state = switched_state;
        if let Some(mode) = switched {
            info!(%mode, pdp_psi = discharge.psi, "governor auto-switched");
            if mode == GovernorMode::Rpm {
                next.throttle_pct = rpm_to_throttle(governor_state.target_rpm());
            }
        }
    }
    next.runtime.governor_mode = governor_state.mode();

    let mut warnings = WarningSet::new();
    warnings.extend(governor_warnings(governor_state.mode(), raw_pdp_psi, &config.governor));
    let validation =
        validate_governor_mode(governor_state.mode(), discharge.psi, state.source, &config.governor);
    if let Some(reason) = validation.reason {
        warnings.push(reason);
    }
    warnings.extend(thermal_warnings(&next.thermal, &config.thermal));
    if cavitating {
        warnings.push(cavitation_warning(intake_psi, rpm));
    }
    warnings.extend(runout_warning(discharge_flow_gpm));
    for id in next.open_lines() {
        let rated = required_nozzle_pressure(&apparatus.line(id).nozzle);
        let actual = lines[id].nozzle_pressure_psi;
        if has_water && actual < rated - NOZZLE_UNDERPRESSURE_MARGIN_PSI {
            warnings.push(format!(
                "{id}: nozzle pressure {actual:.0} PSI, needs {rated:.0} PSI"
            ));
        }
    }
    warnings.extend(overpressure.warning);
    warnings.extend(relief_warning(&state.relief, &relief));
    warnings.extend(discharge.warning);
    warnings.extend(tank_warnings(&next));
    warnings.extend(intake.warning);
    if state.source == WaterSource::Draft && !state.interlocks.primed {
        warnings.push("Cannot pump air: discharge flow stopped until primed");
    }
    next.warnings = warnings;

    let diagnostics = Diagnostics {
        total_flow_gpm: discharge_flow_gpm,
        foam_flow_gpm,
        foam_concentrate_gpm,
        bypass_gpm: relief.bypass_gpm,
        recirc_gpm,
        nozzle_back_pdp_psi,
        required_rpm: if nozzle_back_pdp_psi > 0.0 {
            calculate_required_rpm(requested_flow_gpm, nozzle_back_pdp_psi, intake_psi)
        } else {
            0.0
        },
        raw_pdp_psi,
        achieved_pdp_psi,
        lines,
    };

    Ok(StepOutcome {
        state: next,
        governor: governor_state,
        diagnostics,
    })
}

/// Pump out of gear or emergency stop: no flow, no pressure, cooling down.
fn idle_step(
    mut next: PanelState,
    governor: GovernorState,
    supply: IntakeSupply,
    dt: f64,
    config: &PanelConfig,
) -> StepOutcome {
    let e_stop = next.interlocks.emergency_stop;

    next.runtime.rpm = if e_stop { 0.0 } else { IDLE_RPM };
    next.relief.bypass_gpm = 0.0;
    next.overpressure_secs = 0.0;
    next.cavitating = false;
    next.thermal = update_thermal(
        &next.thermal,
        ThermalInputs {
            engaged: false,
            cooling_flow_gpm: 0.0,
            rpm: next.runtime.rpm,
        },
        dt,
        &config.thermal,
    );

    // A stopped pump draws no vacuum; static supply pressure still shows.
    let (intake_psi, vacuum_inhg) = if supply.source == WaterSource::Draft {
        (0.0, 0.0)
    } else {
        let reading = intake_gauge(
            supply.source,
            supply.intake_psi(),
            supply.tank_to_pump_open,
            supply.primed,
        );
        (reading.psi, reading.vacuum_inhg)
    };
    next.gauges = Gauges {
        intake_psi,
        vacuum_inhg,
        discharge_psi: 0.0,
        flow_gpm: 0.0,
    };

    let mut warnings = WarningSet::new();
    if e_stop {
        warnings.push("EMERGENCY STOP ACTIVE: pump stopped, release to resume");
    }
    warnings.extend(thermal_warnings(&next.thermal, &config.thermal));
    warnings.extend(tank_warnings(&next));
    next.warnings = warnings;

    StepOutcome {
        state: next,
        governor,
        diagnostics: Diagnostics::default(),
    }
}

fn tank_warnings(state: &PanelState) -> Vec<String> {
    let mut warnings = Vec::new();

    if state.water_tank_gal <= 0.0 {
        warnings.push("Water tank empty: switch to an external supply".to_string());
    } else if state.water_tank_gal < state.water_tank_capacity_gal * WATER_LOW_FRACTION {
        warnings.push(format!(
            "Water tank low: {:.0} gal remaining",
            state.water_tank_gal
        ));
    }
    warnings.extend(foam::foam_level_warning(&state.foam));

    warnings
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::LineId;
    use crate::pump::throttle_to_rpm;

    fn rig() -> Apparatus {
        Apparatus::standard_engine()
    }

    fn engaged() -> PanelState {
        let mut state = rig().initial_state();
        state.interlocks.pump_engaged = true;
        state
    }

    fn run(state: &PanelState, governor: &GovernorState, dt: f64) -> StepOutcome {
        simulate_step(state, governor, dt, &rig(), &PanelConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_bad_timestep() {
        let state = engaged();
        let gov = GovernorState::new();
        for dt in [-0.1, f64::NAN, f64::INFINITY] {
            let err = simulate_step(&state, &gov, dt, &rig(), &PanelConfig::default()).unwrap_err();
            assert!(matches!(err, PanelError::InvalidTimestep { .. }));
        }
    }

    #[test]
    fn test_disengaged_idles() {
        let mut state = rig().initial_state();
        state.valves[LineId::Crosslay1] = 100.0;
        let out = run(&state, &GovernorState::new(), 1.0);
        assert!((out.state.runtime.rpm - IDLE_RPM).abs() < f64::EPSILON);
        assert!(out.diagnostics.total_flow_gpm.abs() < f64::EPSILON);
        assert!(out.state.gauges.discharge_psi.abs() < f64::EPSILON);
        assert!((out.state.gauges.intake_psi - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_emergency_stop_zeroes_rpm() {
        let mut state = engaged();
        state.interlocks.emergency_stop = true;
        state.relief.bypass_gpm = 80.0;
        let out = run(&state, &GovernorState::new(), 0.5);
        assert!(out.state.runtime.rpm.abs() < f64::EPSILON);
        assert!(out.state.relief.bypass_gpm.abs() < f64::EPSILON);
        assert!(out.state.warnings.mentions("EMERGENCY STOP"));
    }

    #[test]
    fn test_single_crosslay_from_tank() {
        let mut state = engaged();
        state.valves[LineId::Crosslay1] = 100.0;
        let gov = GovernorState::new().with_mode(GovernorMode::Rpm).with_throttle(60.0);
        let out = run(&state, &gov, 1.0);

        assert!((out.diagnostics.total_flow_gpm - 150.0).abs() < 1e-9);
        assert!(out.diagnostics.nozzle_back_pdp_psi > 150.0);
        assert!(out.state.gauges.discharge_psi > 0.0);
        assert!((out.state.water_tank_gal - 497.5).abs() < 1e-9);
    }

    #[test]
    fn test_tank_valve_closed_supplies_nothing() {
        let mut state = engaged();
        state.tank_to_pump_open = false;
        state.valves[LineId::Crosslay1] = 100.0;
        let out = run(&state, &GovernorState::new(), 1.0);
        assert!(out.diagnostics.total_flow_gpm.abs() < f64::EPSILON);
        assert!(out.state.gauges.discharge_psi.abs() < f64::EPSILON);
        assert!(out.state.warnings.mentions("Tank-to-pump"));
    }

    #[test]
    fn test_unprimed_draft_pumps_nothing() {
        let mut state = engaged();
        state.source = WaterSource::Draft;
        state.valves[LineId::Discharge2] = 100.0;
        let out = run(&state, &GovernorState::new(), 1.0);
        assert!(out.diagnostics.total_flow_gpm.abs() < f64::EPSILON);
        assert!(out.state.gauges.discharge_psi.abs() < f64::EPSILON);
        assert!(out.state.warnings.mentions("Cannot pump air"));
    }

    #[test]
    fn test_no_runout_warning_without_water() {
        let mut state = engaged();
        state.source = WaterSource::Draft;
        for line in LineId::ALL {
            state.valves[line] = 100.0;
        }
        let gov = GovernorState::new().with_mode(GovernorMode::Rpm).with_throttle(100.0);
        let out = run(&state, &gov, 1.0);
        assert!(out.state.warnings.mentions("Cannot pump air"));
        assert!(!out.state.warnings.mentions("High flow"));
        assert!(!out.state.warnings.mentions("RUNOUT"));

        state.interlocks.primed = true;
        let out = run(&state, &gov, 1.0);
        assert!(out.state.warnings.mentions("RUNOUT") || out.state.warnings.mentions("High flow"));
    }

    #[test]
    fn test_open_line_with_broken_hose_fails_tick() {
        let mut rig = rig();
        rig.lines[LineId::Crosslay1].hose.diameter_in = 0.0;
        let mut state = engaged();
        let gov = GovernorState::new();
        assert!(simulate_step(&state, &gov, 0.5, &rig, &PanelConfig::default()).is_ok());

        state.valves[LineId::Crosslay1] = 100.0;
        let err = simulate_step(&state, &gov, 0.5, &rig, &PanelConfig::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_hydrant_recirculation_fills_tank() {
        let mut state = engaged();
        state.source = WaterSource::Hydrant;
        state.water_tank_gal = 100.0;
        state.recirc_pct = 100.0;
        let out = run(&state, &GovernorState::new(), 6.0);
        assert!((out.diagnostics.recirc_gpm - 50.0).abs() < f64::EPSILON);
        assert!((out.state.water_tank_gal - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_churning_pump_heats_and_warns() {
        let mut state = engaged();
        state.thermal.pump_temp_f = 199.0;
        let gov = GovernorState::new().with_mode(GovernorMode::Rpm);
        let out = run(&state, &gov, 1.0);
        assert!((out.state.thermal.pump_temp_f - 204.0).abs() < 1e-9);
        assert!(out.state.warnings.mentions("Pump overheating"));
    }

    #[test]
    fn test_foam_line_draws_concentrate() {
        let mut state = engaged();
        state.valves[LineId::Crosslay1] = 100.0;
        state.foam.master_enabled = true;
        state.foam.enabled_lines.insert(LineId::Crosslay1);
        let out = run(&state, &GovernorState::new(), 60.0);
        assert!((out.diagnostics.foam_flow_gpm - 150.0).abs() < 1e-9);
        assert!((out.state.foam.remaining_gal - 29.1).abs() < 1e-9);
    }

    #[test]
    fn test_cavitation_derates() {
        let mut state = engaged();
        state.source = WaterSource::Relay;
        state.supply_psi = Some(2.0);
        state.valves[LineId::Crosslay1] = 100.0;
        let gov = GovernorState::new().with_mode(GovernorMode::Rpm).with_throttle(100.0);
        let out = run(&state, &gov, 0.1);
        assert!(out.state.cavitating);
        let expected = out.diagnostics.raw_pdp_psi * 0.8;
        assert!((out.diagnostics.achieved_pdp_psi - expected).abs() < 1e-9);
        assert!(out.state.warnings.mentions("CAVITATION"));
    }

    #[test]
    fn test_relief_valve_caps_discharge() {
        let mut state = engaged();
        state.source = WaterSource::Hydrant;
        state.supply_psi = Some(80.0);
        state.valves[LineId::Crosslay1] = 100.0;
        let gov = GovernorState::new().with_mode(GovernorMode::Rpm).with_throttle(100.0);
        let out = run(&state, &gov, 0.1);
        assert!((out.state.gauges.discharge_psi - 275.0).abs() < 1e-9);
        assert!(out.diagnostics.bypass_gpm > 0.0);
    }

    #[test]
    fn test_auto_switch_to_rpm_above_limit() {
        let mut state = engaged();
        state.source = WaterSource::Hydrant;
        state.supply_psi = Some(80.0);
        state.runtime.rpm = 2200.0;
        state.gauges.discharge_psi = 150.0;
        state.valves[LineId::Crosslay1] = 100.0;
        let out = run(&state, &GovernorState::new(), 0.1);
        assert_eq!(out.governor.mode(), GovernorMode::Rpm);
        assert_eq!(out.state.runtime.governor_mode, GovernorMode::Rpm);
        assert!(out.state.warnings.mentions("no surge protection"));
        let throttle_rpm = throttle_to_rpm(out.state.throttle_pct);
        assert!((throttle_rpm - out.governor.target_rpm()).abs() < 1e-9);
    }

    #[test]
    fn test_burst_line_stays_closed() {
        let mut state = engaged();
        state.burst_lines.insert(LineId::Crosslay2);
        state.valves[LineId::Crosslay2] = 100.0;
        let out = run(&state, &GovernorState::new(), 0.5);
        assert!(out.state.valves[LineId::Crosslay2].abs() < f64::EPSILON);
        assert!(out.diagnostics.lines[LineId::Crosslay2].flow_gpm.abs() < f64::EPSILON);
    }
}
