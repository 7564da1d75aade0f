//! Mounting orientation of a sensor relative to the device frame.

use serde::{Deserialize, Serialize};

/// Number of data axes an orientation remaps
pub const ORIENTATION_AXES: usize = 3;

/// Configured source of one output axis
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AxisMapping {
    /// Index of the data channel feeding this axis
    pub map: i64,
    #[serde(default)]
    pub negate: bool,
}

/// Orientation record as found in the sensor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrientationConfig {
    /// Remapping is only applied when set
    #[serde(default)]
    pub rotate: bool,
    #[serde(default)]
    pub x: Option<AxisMapping>,
    #[serde(default)]
    pub y: Option<AxisMapping>,
    #[serde(default)]
    pub z: Option<AxisMapping>,
}

/// Why an orientation record was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOrientation {
    #[error("axis {0} has no mapping")]
    MissingAxis(char),
    #[error("axis {axis} maps to channel {map} (expected 0..{})", ORIENTATION_AXES)]
    AxisOutOfRange { axis: char, map: i64 },
    #[error("channel {0} is mapped to more than one axis")]
    DuplicateMapping(i64),
}

/// Resolved source of one output axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSource {
    pub channel: usize,
    pub negate: bool,
}

impl AxisSource {
    fn pick(&self, data: &[f32; ORIENTATION_AXES]) -> f32 {
        let value = data[self.channel];
        if self.negate {
            -value
        } else {
            value
        }
    }
}

/// Per-axis remapping applied to every decoded sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationTransform {
    pub x: AxisSource,
    pub y: AxisSource,
    pub z: AxisSource,
}

impl Default for OrientationTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl OrientationTransform {
    pub fn identity() -> Self {
        Self {
            x: AxisSource { channel: 0, negate: false },
            y: AxisSource { channel: 1, negate: false },
            z: AxisSource { channel: 2, negate: false },
        }
    }

    /// Validate a configured orientation
    ///
    /// A record with `rotate` unset yields the identity transform.
    pub fn try_from_config(config: &OrientationConfig) -> Result<Self, InvalidOrientation> {
        let x = Self::check_axis('x', config.x)?;
        let y = Self::check_axis('y', config.y)?;
        let z = Self::check_axis('z', config.z)?;

        if x.channel == y.channel {
            return Err(InvalidOrientation::DuplicateMapping(x.channel as i64));
        }
        if y.channel == z.channel || z.channel == x.channel {
            return Err(InvalidOrientation::DuplicateMapping(z.channel as i64));
        }

        if !config.rotate {
            return Ok(Self::identity());
        }
        Ok(Self { x, y, z })
    }

    /// Resolve an optional configured orientation, falling back to identity
    ///
    /// An invalid record does not reject the sensor: it is logged and the
    /// sensor is registered with the identity transform.
    pub fn resolve(config: Option<&OrientationConfig>, sensor_name: &str) -> Self {
        let Some(config) = config else {
            return Self::identity();
        };
        match Self::try_from_config(config) {
            Ok(transform) => transform,
            Err(e) => {
                log::warn!(
                    "Orientation of sensor {} is invalid ({}), using identity",
                    sensor_name,
                    e
                );
                Self::identity()
            }
        }
    }

    fn check_axis(
        axis: char,
        mapping: Option<AxisMapping>,
    ) -> Result<AxisSource, InvalidOrientation> {
        let mapping = mapping.ok_or(InvalidOrientation::MissingAxis(axis))?;
        if mapping.map < 0 || mapping.map >= ORIENTATION_AXES as i64 {
            return Err(InvalidOrientation::AxisOutOfRange {
                axis,
                map: mapping.map,
            });
        }
        Ok(AxisSource {
            channel: mapping.map as usize,
            negate: mapping.negate,
        })
    }

    /// Map raw per-channel data onto the output axes
    pub fn apply(&self, data: &[f32; ORIENTATION_AXES]) -> [f32; ORIENTATION_AXES] {
        [self.x.pick(data), self.y.pick(data), self.z.pick(data)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(map: i64, negate: bool) -> Option<AxisMapping> {
        Some(AxisMapping { map, negate })
    }

    #[test]
    fn test_identity_leaves_samples_unchanged() {
        let transform = OrientationTransform::resolve(None, "Acclerometer");
        assert_eq!(transform.apply(&[1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rotated_mapping() {
        let config = OrientationConfig {
            rotate: true,
            x: mapping(1, true),
            y: mapping(0, false),
            z: mapping(2, true),
        };
        let transform = OrientationTransform::try_from_config(&config).unwrap();
        assert_eq!(transform.apply(&[1.0, 2.0, 3.0]), [-2.0, 1.0, -3.0]);
    }

    #[test]
    fn test_rotate_unset_is_identity() {
        let config = OrientationConfig {
            rotate: false,
            x: mapping(2, true),
            y: mapping(1, false),
            z: mapping(0, false),
        };
        let transform = OrientationTransform::try_from_config(&config).unwrap();
        assert_eq!(transform, OrientationTransform::identity());
    }

    #[test]
    fn test_duplicate_mapping_falls_back_to_identity() {
        let config = OrientationConfig {
            rotate: true,
            x: mapping(0, true),
            y: mapping(0, false),
            z: mapping(2, false),
        };
        assert_eq!(
            OrientationTransform::try_from_config(&config),
            Err(InvalidOrientation::DuplicateMapping(0))
        );
        assert_eq!(
            OrientationTransform::resolve(Some(&config), "Gyroscope"),
            OrientationTransform::identity()
        );
    }

    #[test]
    fn test_missing_or_out_of_range_axis_rejected() {
        let missing = OrientationConfig {
            rotate: true,
            x: mapping(0, false),
            y: None,
            z: mapping(2, false),
        };
        assert_eq!(
            OrientationTransform::try_from_config(&missing),
            Err(InvalidOrientation::MissingAxis('y'))
        );

        let out_of_range = OrientationConfig {
            rotate: true,
            x: mapping(0, false),
            y: mapping(1, false),
            z: mapping(3, false),
        };
        assert_eq!(
            OrientationTransform::try_from_config(&out_of_range),
            Err(InvalidOrientation::AxisOutOfRange { axis: 'z', map: 3 })
        );
    }

    #[test]
    fn test_invalid_orientation_messages() {
        let err = InvalidOrientation::AxisOutOfRange { axis: 'z', map: 3 };
        assert_eq!(err.to_string(), "axis z maps to channel 3 (expected 0..3)");
        assert_eq!(InvalidOrientation::MissingAxis('y').to_string(), "axis y has no mapping");
        let boxed: Box<dyn std::error::Error> = Box::new(InvalidOrientation::DuplicateMapping(0));
        assert_eq!(boxed.to_string(), "channel 0 is mapped to more than one axis");
    }
}
