use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::builder::ModelBuilder;
use crate::PkError;

/// How the drug enters the system.
///
/// Intravenous doses go straight into the central compartment; subcutaneous doses go
/// into an absorption compartment that drains into the central compartment at rate `k_a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryRoute {
    Intravenous,
    Subcutaneous,
}

impl DeliveryRoute {
    /// Index of the central compartment in the state vector
    pub fn central_index(&self) -> usize {
        match self {
            DeliveryRoute::Intravenous => 0,
            DeliveryRoute::Subcutaneous => 1,
        }
    }

    /// Index of the compartment receiving the dose rate
    pub fn dose_index(&self) -> usize {
        0
    }

    /// Number of non-peripheral compartments
    pub fn base_compartments(&self) -> usize {
        self.central_index() + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryRoute::Intravenous => "iv",
            DeliveryRoute::Subcutaneous => "sc",
        }
    }
}

impl fmt::Display for DeliveryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryRoute {
    type Err = PkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iv" | "intravenous" => Ok(DeliveryRoute::Intravenous),
            "sc" | "subcutaneous" => Ok(DeliveryRoute::Subcutaneous),
            other => Err(PkError::configuration(format!(
                "unrecognised delivery route '{}', options are 'iv' (intravenous) or 'sc' (subcutaneous)",
                other
            ))),
        }
    }
}

/// A peripheral compartment exchanging drug with the central compartment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peripheral {
    /// Volume of the compartment
    pub volume: f64,
    /// Inter-compartmental clearance with the central compartment
    pub clearance: f64,
}

impl Peripheral {
    pub fn new(volume: f64, clearance: f64) -> Self {
        Self { volume, clearance }
    }
}

/// Parameters a compartment model must expose to be simulated.
///
/// Implementors only need to provide the accessors; [PkModel::validate] checks the
/// parameter ranges and is run when the model is registered in a
/// [Solution](crate::simulator::solution::Solution).
pub trait PkModel: Debug + Send + Sync {
    fn route(&self) -> DeliveryRoute;

    /// Volume of the central compartment
    fn v_c(&self) -> f64;

    /// Systemic clearance out of the central compartment
    fn cl(&self) -> f64;

    /// Absorption rate, only used by the subcutaneous route
    fn k_a(&self) -> Option<f64>;

    /// Peripheral compartments, in state-vector order
    fn peripherals(&self) -> &[Peripheral];

    /// Length of the state vector for this model
    fn nstates(&self) -> usize {
        self.route().base_compartments() + self.peripherals().len()
    }

    fn validate(&self) -> Result<(), PkError> {
        positive("central volume v_c", self.v_c())?;
        non_negative("clearance cl", self.cl())?;
        if let Some(k_a) = self.k_a() {
            positive("absorption rate k_a", k_a)?;
        }
        for (i, peripheral) in self.peripherals().iter().enumerate() {
            positive(&format!("volume of peripheral {}", i), peripheral.volume)?;
            non_negative(
                &format!("clearance of peripheral {}", i),
                peripheral.clearance,
            )?;
        }
        Ok(())
    }
}

pub(crate) fn positive(name: &str, value: f64) -> Result<(), PkError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PkError::validation(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

pub(crate) fn non_negative(name: &str, value: f64) -> Result<(), PkError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PkError::validation(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )))
    }
}

/// Default parameter store for a compartment model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    route: DeliveryRoute,
    v_c: f64,
    cl: f64,
    k_a: Option<f64>,
    peripherals: Vec<Peripheral>,
}

impl Model {
    pub fn builder(route: DeliveryRoute) -> ModelBuilder {
        ModelBuilder::new(route)
    }

    pub(crate) fn from_parts(
        route: DeliveryRoute,
        v_c: f64,
        cl: f64,
        k_a: Option<f64>,
        peripherals: Vec<Peripheral>,
    ) -> Self {
        Self {
            route,
            v_c,
            cl,
            k_a,
            peripherals,
        }
    }

    pub fn list_compartments(&self) -> &[Peripheral] {
        &self.peripherals
    }
}

impl PkModel for Model {
    fn route(&self) -> DeliveryRoute {
        self.route
    }

    fn v_c(&self) -> f64 {
        self.v_c
    }

    fn cl(&self) -> f64 {
        self.cl
    }

    fn k_a(&self) -> Option<f64> {
        self.k_a
    }

    fn peripherals(&self) -> &[Peripheral] {
        &self.peripherals
    }
}
