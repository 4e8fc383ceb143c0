use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::model::{non_negative, positive};
use crate::PkError;

/// A user supplied dose-rate function of the state vector and time.
pub type DoseFn = Arc<dyn Fn(&[f64], f64) -> f64 + Send + Sync>;

/// Rate at which drug is delivered into the dose compartment over time.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DoseSchedule {
    /// No dosing after the initial dose
    #[default]
    None,
    /// Constant rate over the whole simulation
    Constant { rate: f64 },
    /// A single infusion applied on `[start, start + duration]`
    Infusion { start: f64, duration: f64, rate: f64 },
    /// Infusions of length `duration` repeated every `period`, starting at `start`
    Periodic {
        start: f64,
        period: f64,
        duration: f64,
        rate: f64,
    },
    /// Arbitrary dose-rate function.
    ///
    /// The integrator's Jacobian ignores how the rate depends on the state, so Newton
    /// iterations may converge slowly, or not at all, for a strongly state-dependent rate.
    /// A rate that becomes non-finite ends the solve with a numerical error.
    #[serde(skip)]
    Custom(DoseFn),
}

impl DoseSchedule {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        DoseSchedule::Custom(Arc::new(f))
    }

    pub fn rate(&self, q: &[f64], t: f64) -> f64 {
        match self {
            DoseSchedule::None => 0.0,
            DoseSchedule::Constant { rate } => *rate,
            DoseSchedule::Infusion {
                start,
                duration,
                rate,
            } => {
                if t >= *start && t <= start + duration {
                    *rate
                } else {
                    0.0
                }
            }
            DoseSchedule::Periodic {
                start,
                period,
                duration,
                rate,
            } => {
                if t < *start {
                    return 0.0;
                }
                let phase = (t - start) % period;
                if phase <= *duration {
                    *rate
                } else {
                    0.0
                }
            }
            DoseSchedule::Custom(f) => f(q, t),
        }
    }

    pub fn validate(&self) -> Result<(), PkError> {
        match self {
            DoseSchedule::None | DoseSchedule::Custom(_) => Ok(()),
            DoseSchedule::Constant { rate } => finite("dose rate", *rate),
            DoseSchedule::Infusion {
                start,
                duration,
                rate,
            } => {
                finite("infusion start", *start)?;
                non_negative("infusion duration", *duration)?;
                finite("dose rate", *rate)
            }
            DoseSchedule::Periodic {
                start,
                period,
                duration,
                rate,
            } => {
                finite("infusion start", *start)?;
                positive("dosing period", *period)?;
                non_negative("infusion duration", *duration)?;
                if duration > period {
                    return Err(PkError::validation(format!(
                        "infusion duration {} exceeds the dosing period {}",
                        duration, period
                    )));
                }
                finite("dose rate", *rate)
            }
        }
    }
}

impl Debug for DoseSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoseSchedule::None => write!(f, "None"),
            DoseSchedule::Constant { rate } => {
                f.debug_struct("Constant").field("rate", rate).finish()
            }
            DoseSchedule::Infusion {
                start,
                duration,
                rate,
            } => f
                .debug_struct("Infusion")
                .field("start", start)
                .field("duration", duration)
                .field("rate", rate)
                .finish(),
            DoseSchedule::Periodic {
                start,
                period,
                duration,
                rate,
            } => f
                .debug_struct("Periodic")
                .field("start", start)
                .field("period", period)
                .field("duration", duration)
                .field("rate", rate)
                .finish(),
            DoseSchedule::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

fn finite(name: &str, value: f64) -> Result<(), PkError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PkError::validation(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

/// What a dosing protocol must expose to drive a simulation.
pub trait DosingProtocol: Debug + Send + Sync {
    /// Instantaneous dose rate into the dose compartment
    fn dose_rate(&self, q: &[f64], t: f64) -> f64;

    /// Quantity placed in the central compartment at the start of the simulation
    fn initial_dose(&self) -> f64;

    /// Length of the simulated interval, starting at zero
    fn time_span(&self) -> f64;

    fn validate(&self) -> Result<(), PkError> {
        non_negative("initial dose", self.initial_dose())?;
        positive("time span", self.time_span())
    }
}

/// Default parameter store for a dosing protocol.
#[derive(Debug, Clone)]
pub struct Protocol {
    schedule: DoseSchedule,
    initial_dose: f64,
    time_span: f64,
}

impl Protocol {
    pub fn new(schedule: DoseSchedule, initial_dose: f64, time_span: f64) -> Result<Self, PkError> {
        let protocol = Self {
            schedule,
            initial_dose,
            time_span,
        };
        protocol.schedule.validate()?;
        DosingProtocol::validate(&protocol)?;
        Ok(protocol)
    }

    /// A single dose given at time zero, with no further dosing
    pub fn bolus(initial_dose: f64, time_span: f64) -> Result<Self, PkError> {
        Self::new(DoseSchedule::None, initial_dose, time_span)
    }

    pub fn schedule(&self) -> &DoseSchedule {
        &self.schedule
    }

    /// The dose-rate function of this protocol
    pub fn dose(&self) -> impl Fn(&[f64], f64) -> f64 + '_ {
        move |q, t| self.schedule.rate(q, t)
    }

    /// `n` evenly spaced time points covering `[0, time_span]`
    pub fn time_points(&self, n: usize) -> Vec<f64> {
        linspace(0.0, self.time_span, n)
    }
}

impl DosingProtocol for Protocol {
    fn dose_rate(&self, q: &[f64], t: f64) -> f64 {
        self.schedule.rate(q, t)
    }

    fn initial_dose(&self) -> f64 {
        self.initial_dose
    }

    fn time_span(&self) -> f64 {
        self.time_span
    }
}

pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infusion_window_is_inclusive() {
        let schedule = DoseSchedule::Infusion {
            start: 1.0,
            duration: 2.0,
            rate: 4.0,
        };
        assert_eq!(schedule.rate(&[], 0.5), 0.0);
        assert_eq!(schedule.rate(&[], 1.0), 4.0);
        assert_eq!(schedule.rate(&[], 3.0), 4.0);
        assert_eq!(schedule.rate(&[], 3.5), 0.0);
    }

    #[test]
    fn periodic_schedule_repeats() {
        let schedule = DoseSchedule::Periodic {
            start: 0.0,
            period: 12.0,
            duration: 1.0,
            rate: 10.0,
        };
        assert_eq!(schedule.rate(&[], 0.5), 10.0);
        assert_eq!(schedule.rate(&[], 6.0), 0.0);
        assert_eq!(schedule.rate(&[], 12.5), 10.0);
    }

    #[test]
    fn custom_schedule_sees_state() {
        let schedule = DoseSchedule::custom(|q, t| q[0] * t);
        assert_eq!(schedule.rate(&[2.0], 3.0), 6.0);
    }

    #[test]
    fn dose_function_follows_schedule() {
        let protocol = Protocol::new(DoseSchedule::Constant { rate: 2.5 }, 0.0, 1.0).unwrap();
        let dose = protocol.dose();
        assert_eq!(dose(&[0.0], 0.3), 2.5);
        assert_eq!(dose(&[0.0], 0.3), protocol.dose_rate(&[0.0], 0.3));
    }

    #[test]
    fn protocol_rejects_negative_time_span() {
        let err = Protocol::bolus(1.0, -2.0).unwrap_err();
        assert!(matches!(err, PkError::Validation(_)));
    }

    #[test]
    fn periodic_duration_cannot_exceed_period() {
        let schedule = DoseSchedule::Periodic {
            start: 0.0,
            period: 1.0,
            duration: 2.0,
            rate: 1.0,
        };
        assert!(Protocol::new(schedule, 0.0, 10.0).is_err());
    }

    #[test]
    fn time_points_cover_span() {
        let protocol = Protocol::bolus(1.0, 10.0).unwrap();
        let times = protocol.time_points(5);
        assert_eq!(times, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(protocol.time_points(1), vec![0.0]);
        assert!(protocol.time_points(0).is_empty());
    }

    #[test]
    fn schedule_serde_uses_kind_tag() {
        let schedule: DoseSchedule =
            serde_json::from_str(r#"{"kind":"constant","rate":5.0}"#).unwrap();
        assert_eq!(schedule.rate(&[], 100.0), 5.0);
        let none: DoseSchedule = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(none.rate(&[], 0.0), 0.0);
    }
}
