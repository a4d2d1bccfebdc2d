//! Per-plot operational settings carried through the plan

use crate::error::{Result, TrialplanError};
use serde::{Deserialize, Serialize};

pub const HITCH_HEIGHT_MIN: f64 = 0.16;
pub const HITCH_HEIGHT_MAX: f64 = 0.6;
pub const WORKING_SPEED_MIN: f64 = 0.1;
pub const WORKING_SPEED_MAX: f64 = 6.0;
pub const PTO_RPM_MIN: u32 = 0;
pub const PTO_RPM_MAX: u32 = 1000;

/// What the machine does while driving through a plot.
///
/// None of these values take part in geometry; they are exported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkAttributes {
    /// Implement engaged inside the plot
    pub work: bool,
    /// Plot is skipped by the machine
    pub ignored: bool,
    /// Machine must drive the plot in the exported direction
    pub force_direction: bool,
    /// km/h
    pub working_speed: f64,
    /// m
    pub hitch_height: f64,
    pub pto_rpm: u32,
}

impl Default for WorkAttributes {
    fn default() -> Self {
        Self {
            work: true,
            ignored: false,
            force_direction: false,
            working_speed: 1.0,
            hitch_height: 0.6,
            pto_rpm: 0,
        }
    }
}

fn check_range(key: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(TrialplanError::InvalidWorkAttribute { key: key.to_string(), value, min, max });
    }
    Ok(())
}

impl WorkAttributes {
    /// Reject values outside the machine's operating ranges
    pub fn validate(&self) -> Result<()> {
        check_range("working_speed", self.working_speed, WORKING_SPEED_MIN, WORKING_SPEED_MAX)?;
        check_range("hitch_height", self.hitch_height, HITCH_HEIGHT_MIN, HITCH_HEIGHT_MAX)?;
        check_range(
            "pto_rpm",
            f64::from(self.pto_rpm),
            f64::from(PTO_RPM_MIN),
            f64::from(PTO_RPM_MAX),
        )?;
        Ok(())
    }

    /// Return a copy with `settings` applied, or an error if the result is out
    /// of range. `self` is left untouched on error.
    pub fn patched(&self, settings: &WorkSettings) -> Result<Self> {
        let mut next = *self;
        if let Some(work) = settings.work {
            next.work = work;
        }
        if let Some(ignored) = settings.ignored {
            next.ignored = ignored;
        }
        if let Some(force_direction) = settings.force_direction {
            next.force_direction = force_direction;
        }
        if let Some(working_speed) = settings.working_speed {
            next.working_speed = working_speed;
        }
        if let Some(hitch_height) = settings.hitch_height {
            next.hitch_height = hitch_height;
        }
        if let Some(pto_rpm) = settings.pto_rpm {
            next.pto_rpm = pto_rpm;
        }
        next.validate()?;
        Ok(next)
    }
}

/// A partial update of [`WorkAttributes`]; unset fields keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkSettings {
    pub work: Option<bool>,
    pub ignored: Option<bool>,
    pub force_direction: Option<bool>,
    pub working_speed: Option<f64>,
    pub hitch_height: Option<f64>,
    pub pto_rpm: Option<u32>,
}

impl WorkSettings {
    pub fn is_empty(&self) -> bool {
        *self == WorkSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WorkAttributes::default().validate().is_ok());
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let base = WorkAttributes::default();
        let patched = base
            .patched(&WorkSettings { working_speed: Some(4.5), ignored: Some(true), ..Default::default() })
            .unwrap();

        assert_eq!(patched.working_speed, 4.5);
        assert!(patched.ignored);
        assert_eq!(patched.hitch_height, base.hitch_height);
        assert_eq!(patched.pto_rpm, base.pto_rpm);
    }

    #[test]
    fn test_patch_rejects_out_of_range() {
        let base = WorkAttributes::default();
        let err = base
            .patched(&WorkSettings { hitch_height: Some(0.9), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, TrialplanError::InvalidWorkAttribute { ref key, .. } if key == "hitch_height"));

        assert!(base.patched(&WorkSettings { pto_rpm: Some(1500), ..Default::default() }).is_err());
        assert!(base
            .patched(&WorkSettings { working_speed: Some(0.0), ..Default::default() })
            .is_err());
    }

    #[test]
    fn test_empty_settings() {
        assert!(WorkSettings::default().is_empty());
        assert!(!WorkSettings { work: Some(false), ..Default::default() }.is_empty());
    }
}
