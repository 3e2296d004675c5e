//! CLI output formatting.

use crate::drill::DrillTrace;

/// Print version information.
pub fn print_version() {
    println!(
        "pumpsim {} ({})",
        env!("PUMPSIM_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown")
    );
}

/// Print help message.
pub fn print_help() {
    println!(
        r"pumpsim - Fire apparatus pump panel simulator

USAGE:
    pumpsim <COMMAND> [OPTIONS]

COMMANDS:
    run <drill.yaml>            Replay a drill
        --apparatus <file>      Use an apparatus profile instead of the built-in engine
        --json                  Print the full trace as JSON
        -v, --verbose           Print every frame and log at info level

    validate <drill.yaml>       Check a drill file without running it

    profile                     Print the built-in apparatus profile as YAML

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    pumpsim run drills/hydrant_hookup.yaml
    pumpsim run drills/relay_overpressure.yaml --json > trace.json
    pumpsim profile > engine.yaml

Set RUST_LOG to control log output (default: warn).
"
    );
}

/// Print one line per recorded frame.
pub fn print_trace_table(trace: &DrillTrace) {
    println!(
        "{:>8} {:>6} {:>9} {:>8} {:>8} {:>7} {:>7} {:>6}",
        "t (s)", "rpm", "mode", "intake", "pdp", "gpm", "tank", "pump°F"
    );
    for frame in &trace.frames {
        let intake = if frame.vacuum_inhg > 0.0 {
            format!("{:.1}inHg", frame.vacuum_inhg)
        } else {
            format!("{:.0}", frame.intake_psi)
        };
        println!(
            "{:>8.2} {:>6.0} {:>9} {:>8} {:>8.0} {:>7.0} {:>7.0} {:>6.0}",
            frame.t,
            frame.rpm,
            frame.governor_mode.to_string(),
            intake,
            frame.discharge_psi,
            frame.flow_gpm,
            frame.water_tank_gal,
            frame.pump_temp_f
        );
        for warning in &frame.warnings {
            println!("         ! {warning}");
        }
    }
    println!();
}

/// Print the whole-drill totals.
pub fn print_drill_summary(trace: &DrillTrace) {
    let s = &trace.summary;

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    println!("  Peak discharge:   {:.0} PSI", s.peak_discharge_psi);
    println!("  Peak pump output: {:.0} PSI", s.peak_raw_pdp_psi);
    println!("  Peak pump temp:   {:.0} °F", s.peak_pump_temp_f);
    println!("  Cavitating:       {:.1} s", s.cavitation_secs);
    println!("  Water flowed:     {:.1} gal", s.water_flowed_gal);
    println!("  Tank change:      {:+.1} gal", s.tank_change_gal);
    println!("  Foam used:        {:.2} gal", s.foam_used_gal);

    if let Some(last) = trace.last() {
        if !last.warnings.is_empty() {
            println!("\n  Final warnings:");
            for warning in &last.warnings {
                println!("    • {warning}");
            }
        }
    }

    if s.burst_lines.is_empty() {
        println!("\n✓ No hose failures");
    } else {
        let lines: Vec<String> = s.burst_lines.iter().map(ToString::to_string).collect();
        println!("\n✗ Hose failures: {}", lines.join(", "));
    }
}
