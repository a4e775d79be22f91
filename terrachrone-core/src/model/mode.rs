use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Travel mode selecting the speed model and whether slope matters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Pedestrian { with_slope: bool },
    Cycle,
    Drive,
}

impl TravelMode {
    /// Constant speed (km/h) used where no per-edge speed is declared
    pub fn default_speed_kmh(&self) -> f64 {
        match self {
            TravelMode::Pedestrian { .. } => 4.0,
            TravelMode::Cycle => 15.0,
            TravelMode::Drive => 20.0,
        }
    }

    /// Whether the elevation penalty applies to this mode
    pub fn is_slope_aware(&self) -> bool {
        matches!(self, TravelMode::Pedestrian { with_slope: true })
    }

    /// Label written to the `mode` field of output records
    pub fn label(&self) -> &'static str {
        match self {
            TravelMode::Pedestrian { .. } => "walk",
            TravelMode::Cycle => "cycle",
            TravelMode::Drive => "drive",
        }
    }
}

impl Default for TravelMode {
    fn default() -> Self {
        TravelMode::Pedestrian { with_slope: true }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TravelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" | "pedestrian" | "foot" => Ok(TravelMode::Pedestrian { with_slope: true }),
            "walk-flat" | "walk_flat" => Ok(TravelMode::Pedestrian { with_slope: false }),
            "cycle" | "bike" | "bicycle" => Ok(TravelMode::Cycle),
            "drive" | "car" => Ok(TravelMode::Drive),
            other => Err(Error::InvalidData(format!("Unknown travel mode '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_aliases() {
        assert_eq!(
            "Walk".parse::<TravelMode>().unwrap(),
            TravelMode::Pedestrian { with_slope: true }
        );
        assert_eq!("bike".parse::<TravelMode>().unwrap(), TravelMode::Cycle);
        assert_eq!("car".parse::<TravelMode>().unwrap(), TravelMode::Drive);
        assert!("boat".parse::<TravelMode>().is_err());
    }

    #[test]
    fn only_sloped_walking_is_slope_aware() {
        assert!(TravelMode::Pedestrian { with_slope: true }.is_slope_aware());
        assert!(!TravelMode::Pedestrian { with_slope: false }.is_slope_aware());
        assert!(!TravelMode::Cycle.is_slope_aware());
        assert_eq!(TravelMode::Drive.default_speed_kmh(), 20.0);
    }
}
