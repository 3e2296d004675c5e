//! Discharge line identifiers, per-line tables and static line configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::{PanelError, PanelResult};

/// One of the ten discharge lines on the apparatus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LineId {
    /// Crosslay 1 (1¾" preconnect).
    Crosslay1,
    /// Crosslay 2 (1¾" preconnect).
    Crosslay2,
    /// Crosslay 3 (2½" preconnect).
    Crosslay3,
    /// Front bumper trash line.
    FrontBumper,
    /// Side discharge 1.
    Discharge1,
    /// Side discharge 2.
    Discharge2,
    /// Side discharge 3.
    Discharge3,
    /// Side discharge 4.
    Discharge4,
    /// Deck gun (master stream, smooth bore).
    DeckGun,
    /// Portable monitor (master stream, fog).
    Monitor,
}

impl LineId {
    /// Number of discharge lines on the panel.
    pub const COUNT: usize = 10;

    /// All lines in panel order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Crosslay1,
        Self::Crosslay2,
        Self::Crosslay3,
        Self::FrontBumper,
        Self::Discharge1,
        Self::Discharge2,
        Self::Discharge3,
        Self::Discharge4,
        Self::DeckGun,
        Self::Monitor,
    ];

    /// Position of this line in per-line tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable machine key (matches the serde representation).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Crosslay1 => "crosslay1",
            Self::Crosslay2 => "crosslay2",
            Self::Crosslay3 => "crosslay3",
            Self::FrontBumper => "front_bumper",
            Self::Discharge1 => "discharge1",
            Self::Discharge2 => "discharge2",
            Self::Discharge3 => "discharge3",
            Self::Discharge4 => "discharge4",
            Self::DeckGun => "deck_gun",
            Self::Monitor => "monitor",
        }
    }

    /// Operator-facing label as printed on the panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crosslay1 => "Crosslay 1",
            Self::Crosslay2 => "Crosslay 2",
            Self::Crosslay3 => "Crosslay 3",
            Self::FrontBumper => "Front Bumper",
            Self::Discharge1 => "Discharge 1",
            Self::Discharge2 => "Discharge 2",
            Self::Discharge3 => "Discharge 3",
            Self::Discharge4 => "Discharge 4",
            Self::DeckGun => "Deck Gun",
            Self::Monitor => "Monitor",
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LineId {
    type Err = PanelError;

    fn from_str(s: &str) -> PanelResult<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| PanelError::UnknownLine(s.to_string()))
    }
}

/// Fixed-size table keyed by [`LineId`].
///
/// Iteration order is always panel order, which keeps every tick
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerLine<T>([T; LineId::COUNT]);

impl<T> PerLine<T> {
    /// Build a table by evaluating `f` for every line.
    pub fn from_fn(mut f: impl FnMut(LineId) -> T) -> Self {
        Self(std::array::from_fn(|i| f(LineId::ALL[i])))
    }

    /// Iterate `(line, value)` pairs in panel order.
    pub fn iter(&self) -> impl Iterator<Item = (LineId, &T)> {
        LineId::ALL.into_iter().zip(self.0.iter())
    }

    /// Transform every entry.
    pub fn map<U>(&self, mut f: impl FnMut(LineId, &T) -> U) -> PerLine<U> {
        PerLine::from_fn(|id| f(id, &self.0[id.index()]))
    }

    /// Raw values in panel order.
    #[must_use]
    pub const fn values(&self) -> &[T; LineId::COUNT] {
        &self.0
    }
}

impl<T: Default> Default for PerLine<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<LineId> for PerLine<T> {
    type Output = T;

    fn index(&self, id: LineId) -> &T {
        &self.0[id.index()]
    }
}

impl<T> IndexMut<LineId> for PerLine<T> {
    fn index_mut(&mut self, id: LineId) -> &mut T {
        &mut self.0[id.index()]
    }
}

/// Hose geometry used by the friction-loss formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoseSpec {
    /// Inside diameter (inches).
    pub diameter_in: f64,
    /// Lay length (feet).
    pub length_ft: f64,
    /// Hazen-Williams roughness coefficient C.
    pub roughness_c: f64,
}

/// Nozzle attached to a line. Each variant carries exactly the
/// parameter its flow model needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum NozzleSpec {
    /// Handline smooth bore tip.
    Smooth {
        /// Tip diameter (inches).
        tip_in: f64,
    },
    /// Handline fog nozzle (fixed gallonage).
    Fog {
        /// Rated flow (GPM).
        target_gpm: f64,
    },
    /// Master-stream smooth bore tip.
    MasterSmooth {
        /// Tip diameter (inches).
        tip_in: f64,
    },
    /// Master-stream fog nozzle.
    MasterFog {
        /// Rated flow (GPM).
        target_gpm: f64,
    },
}

/// Static description of one discharge line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Hose lay.
    pub hose: HoseSpec,
    /// Nozzle on the end of the lay.
    pub nozzle: NozzleSpec,
    /// Whether the line is plumbed to the foam proportioner.
    #[serde(default)]
    pub foam_capable: bool,
}
