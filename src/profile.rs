//! Apparatus profile: the fixed line table and a fresh panel.
//!
//! The built-in profile is a 1500 GPM triple-combination engine with
//! three crosslays, a bumper line, four side discharges, a deck gun and a
//! portable monitor. Profiles round-trip through YAML so a department can
//! describe its own rig; every line is validated on load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{PanelError, PanelResult};
use crate::hydraulics::validate_line;
use crate::model::{
    FoamSystem, Gauges, GovernorMode, HoseSpec, Interlocks, LineConfig, LineId, NozzleSpec,
    PanelState, PerLine, ReliefValve, Runtime, ThermalState, WaterSource, WarningSet,
};

/// Engine speed at idle with the pump out of gear.
pub const IDLE_RPM: f64 = 800.0;
/// Booster tank size on the built-in profile (gallons).
pub const WATER_TANK_GAL: f64 = 500.0;
/// Relief valve setpoint on a fresh panel (PSI).
pub const RELIEF_SETPOINT_PSI: f64 = 275.0;

/// Static apparatus description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApparatusDoc", into = "ApparatusDoc")]
pub struct Apparatus {
    /// Display name.
    pub name: String,
    /// Booster tank size (gallons).
    pub water_tank_gal: f64,
    /// Foam cell size (gallons).
    pub foam_tank_gal: f64,
    /// Line table.
    pub lines: PerLine<LineConfig>,
}

/// On-disk shape: lines keyed by name so YAML stays readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApparatusDoc {
    name: String,
    water_tank_gal: f64,
    foam_tank_gal: f64,
    lines: IndexMap<LineId, LineConfig>,
}

impl TryFrom<ApparatusDoc> for Apparatus {
    type Error = PanelError;

    fn try_from(doc: ApparatusDoc) -> PanelResult<Self> {
        let missing: Vec<&str> = LineId::ALL
            .into_iter()
            .filter(|id| !doc.lines.contains_key(id))
            .map(LineId::key)
            .collect();
        if !missing.is_empty() {
            return Err(PanelError::config(format!(
                "apparatus '{}' is missing lines: {}",
                doc.name,
                missing.join(", ")
            )));
        }

        let mut lines = PerLine::from_fn(|_| LineConfig {
            hose: HoseSpec {
                diameter_in: 0.0,
                length_ft: 0.0,
                roughness_c: 0.0,
            },
            nozzle: NozzleSpec::Fog { target_gpm: 0.0 },
            foam_capable: false,
        });
        for (id, line) in doc.lines {
            lines[id] = line;
        }

        let apparatus = Self {
            name: doc.name,
            water_tank_gal: doc.water_tank_gal,
            foam_tank_gal: doc.foam_tank_gal,
            lines,
        };
        apparatus.validate()?;
        Ok(apparatus)
    }
}

impl From<Apparatus> for ApparatusDoc {
    fn from(apparatus: Apparatus) -> Self {
        Self {
            name: apparatus.name,
            water_tank_gal: apparatus.water_tank_gal,
            foam_tank_gal: apparatus.foam_tank_gal,
            lines: apparatus.lines.iter().map(|(id, line)| (id, *line)).collect(),
        }
    }
}

const fn hose(diameter_in: f64, length_ft: f64) -> HoseSpec {
    HoseSpec {
        diameter_in,
        length_ft,
        roughness_c: 150.0,
    }
}

const fn line(hose: HoseSpec, nozzle: NozzleSpec, foam_capable: bool) -> LineConfig {
    LineConfig {
        hose,
        nozzle,
        foam_capable,
    }
}

impl Apparatus {
    /// The built-in 1500 GPM engine.
    #[must_use]
    pub fn standard_engine() -> Self {
        let lines = PerLine::from_fn(|id| match id {
            LineId::Crosslay1 | LineId::Crosslay2 => {
                line(hose(1.75, 200.0), NozzleSpec::Fog { target_gpm: 150.0 }, true)
            }
            LineId::Crosslay3 => line(hose(2.5, 200.0), NozzleSpec::Smooth { tip_in: 1.125 }, true),
            LineId::FrontBumper => line(hose(1.75, 100.0), NozzleSpec::Fog { target_gpm: 95.0 }, true),
            LineId::Discharge1 => line(hose(2.5, 300.0), NozzleSpec::Smooth { tip_in: 1.125 }, false),
            LineId::Discharge2 => line(hose(2.5, 300.0), NozzleSpec::Fog { target_gpm: 250.0 }, false),
            LineId::Discharge3 => line(hose(1.75, 150.0), NozzleSpec::Smooth { tip_in: 0.875 }, true),
            LineId::Discharge4 => line(hose(3.0, 200.0), NozzleSpec::Fog { target_gpm: 250.0 }, false),
            LineId::DeckGun => line(
                HoseSpec {
                    diameter_in: 3.0,
                    length_ft: 10.0,
                    roughness_c: 140.0,
                },
                NozzleSpec::MasterSmooth { tip_in: 1.375 },
                false,
            ),
            LineId::Monitor => line(hose(3.0, 100.0), NozzleSpec::MasterFog { target_gpm: 500.0 }, false),
        });

        Self {
            name: "Engine 1 (1500 GPM)".to_string(),
            water_tank_gal: WATER_TANK_GAL,
            foam_tank_gal: 30.0,
            lines,
        }
    }

    /// Configuration for one line.
    #[must_use]
    pub fn line(&self, id: LineId) -> &LineConfig {
        &self.lines[id]
    }

    /// Fail-fast check of every line and tank size.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first bad line.
    pub fn validate(&self) -> PanelResult<()> {
        for (name, gal) in [("water tank", self.water_tank_gal), ("foam tank", self.foam_tank_gal)] {
            if !gal.is_finite() || gal < 0.0 {
                return Err(PanelError::config(format!(
                    "{name} size must be a non-negative number, got {gal}"
                )));
            }
        }
        for (id, config) in self.lines.iter() {
            validate_line(config).map_err(|err| match err {
                PanelError::Configuration { message } => {
                    PanelError::config(format!("{id}: {message}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Parse and validate a profile from YAML.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first validation failure.
    pub fn from_yaml(yaml: &str) -> PanelResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load and validate a profile file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse or validation error.
    pub fn load<P: AsRef<Path>>(path: P) -> PanelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Render the profile as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> PanelResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// A fresh panel: pump out of gear, tanks full, relief armed.
    #[must_use]
    pub fn initial_state(&self) -> PanelState {
        PanelState {
            throttle_pct: 0.0,
            source: WaterSource::Tank,
            supply_psi: None,
            valves: PerLine::default(),
            tank_to_pump_open: true,
            recirc_pct: 0.0,
            foam: FoamSystem {
                remaining_gal: self.foam_tank_gal,
                capacity_gal: self.foam_tank_gal,
                ..FoamSystem::default()
            },
            water_tank_gal: self.water_tank_gal,
            water_tank_capacity_gal: self.water_tank_gal,
            interlocks: Interlocks::default(),
            runtime: Runtime {
                rpm: IDLE_RPM,
                governor_mode: GovernorMode::Pressure,
            },
            relief: ReliefValve {
                enabled: true,
                setpoint_psi: RELIEF_SETPOINT_PSI,
                bypass_gpm: 0.0,
            },
            gauges: Gauges::default(),
            thermal: ThermalState::default(),
            warnings: WarningSet::new(),
            cavitating: false,
            overpressure_secs: 0.0,
            burst_lines: BTreeSet::new(),
        }
    }
}

impl Default for Apparatus {
    fn default() -> Self {
        Self::standard_engine()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_engine_is_valid() {
        let rig = Apparatus::standard_engine();
        assert!(rig.validate().is_ok());
        assert!(rig.line(LineId::Crosslay1).foam_capable);
        assert!(!rig.line(LineId::DeckGun).foam_capable);
    }

    #[test]
    fn test_initial_state_defaults() {
        let state = Apparatus::standard_engine().initial_state();
        assert!(!state.interlocks.pump_engaged);
        assert!((state.water_tank_gal - 500.0).abs() < f64::EPSILON);
        assert!((state.foam.remaining_gal - 30.0).abs() < f64::EPSILON);
        assert!((state.foam.percent - 0.6).abs() < f64::EPSILON);
        assert!(state.relief.enabled);
        assert!((state.relief.setpoint_psi - 275.0).abs() < f64::EPSILON);
        assert_eq!(state.open_lines().count(), 0);
        assert!(state.burst_lines.is_empty());
    }

    #[test]
    fn test_yaml_round_trip() {
        let rig = Apparatus::standard_engine();
        let yaml = rig.to_yaml().unwrap();
        assert!(yaml.contains("deck_gun"));
        assert!(yaml.contains("master_smooth"));
        assert_eq!(Apparatus::from_yaml(&yaml).unwrap(), rig);
    }

    #[test]
    fn test_missing_line_rejected() {
        let yaml = Apparatus::standard_engine()
            .to_yaml()
            .unwrap()
            .replace("monitor:", "monitr:");
        assert!(Apparatus::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_bad_nozzle_rejected() {
        let mut rig = Apparatus::standard_engine();
        rig.lines[LineId::Crosslay3].nozzle = NozzleSpec::Smooth { tip_in: 0.0 };
        let err = rig.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Crosslay 3"));
    }

    #[test]
    fn test_nozzle_missing_field_is_parse_error() {
        let yaml = Apparatus::standard_engine()
            .to_yaml()
            .unwrap()
            .replacen("tip_in", "tip", 1);
        assert!(Apparatus::from_yaml(&yaml).is_err());
    }
}
