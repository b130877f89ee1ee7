//! Modification time tolerance window.

use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: i64 = 3600;

/// Accepted shift between the work file and the original modification time.
///
/// Written by users as `false`, `true` (±1 h), `N` (±N h) or `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawTolerance", into = "RawTolerance")]
pub enum HourTolerance {
    /// Times must be equal at second precision
    #[default]
    Exact,
    /// `work - original` must lie within `low..=high` hours
    Window { low: i64, high: i64 },
}

impl HourTolerance {
    /// ±`hours` window
    pub fn symmetric(hours: i64) -> Self {
        let hours = hours.abs();
        if hours == 0 {
            return HourTolerance::Exact;
        }
        HourTolerance::Window {
            low: -hours,
            high: hours,
        }
    }

    /// Explicit window, e.g. `asymmetric(-1, 3)`
    pub fn asymmetric(low: i64, high: i64) -> Self {
        HourTolerance::Window { low, high }
    }

    /// Window bounds in seconds
    pub fn seconds(&self) -> (i64, i64) {
        match self {
            HourTolerance::Exact => (0, 0),
            HourTolerance::Window { low, high } => {
                (low * SECONDS_PER_HOUR, high * SECONDS_PER_HOUR)
            }
        }
    }

    /// Does a `work - original` delta in seconds fall inside the window?
    pub fn accepts(&self, delta_secs: i64) -> bool {
        let (low, high) = self.seconds();
        low <= delta_secs && delta_secs <= high
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTolerance {
    Flag(bool),
    Hours(i64),
    Range(i64, i64),
}

impl From<RawTolerance> for HourTolerance {
    fn from(raw: RawTolerance) -> Self {
        match raw {
            RawTolerance::Flag(false) => HourTolerance::Exact,
            RawTolerance::Flag(true) => HourTolerance::symmetric(1),
            RawTolerance::Hours(hours) => HourTolerance::symmetric(hours),
            RawTolerance::Range(low, high) => HourTolerance::asymmetric(low, high),
        }
    }
}

impl From<HourTolerance> for RawTolerance {
    fn from(tolerance: HourTolerance) -> Self {
        match tolerance {
            HourTolerance::Exact => RawTolerance::Flag(false),
            HourTolerance::Window { low, high } => RawTolerance::Range(low, high),
        }
    }
}
