//! Serialisable descriptions of models, protocols and whole studies

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::{DeliveryRoute, DoseSchedule, Model, Peripheral, PkModel, Protocol};
use crate::simulator::{Solution, SolverOptions};
use crate::PkError;

/// A compartment model as written in a study file.
///
/// The route is kept as free text so that an unknown route surfaces as a configuration
/// error rather than a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub route: String,
    pub v_c: f64,
    #[serde(default)]
    pub cl: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peripherals: Vec<Peripheral>,
}

impl TryFrom<ModelConfig> for Model {
    type Error = PkError;

    fn try_from(config: ModelConfig) -> Result<Self, Self::Error> {
        let route: DeliveryRoute = config.route.parse()?;
        let mut builder = Model::builder(route).v_c(config.v_c).cl(config.cl);
        if let Some(k_a) = config.k_a {
            builder = builder.k_a(k_a);
        }
        for peripheral in config.peripherals {
            builder = builder.peripheral(peripheral.volume, peripheral.clearance);
        }
        builder.build()
    }
}

impl From<&Model> for ModelConfig {
    fn from(model: &Model) -> Self {
        Self {
            route: model.route().to_string(),
            v_c: model.v_c(),
            cl: model.cl(),
            k_a: model.k_a(),
            peripherals: model.peripherals().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub schedule: DoseSchedule,
    #[serde(default)]
    pub initial_dose: f64,
    pub time_span: f64,
}

impl TryFrom<ProtocolConfig> for Protocol {
    type Error = PkError;

    fn try_from(config: ProtocolConfig) -> Result<Self, Self::Error> {
        Protocol::new(config.schedule, config.initial_dose, config.time_span)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairConfig {
    pub model: ModelConfig,
    pub protocol: ProtocolConfig,
}

/// Solver settings plus the model/protocol pairs to register.
///
/// ```ignore
/// let study = StudyConfig::from_str(r#"{
///     "solver": { "rtol": 1e-6 },
///     "pairs": [{
///         "model": { "route": "iv", "v_c": 10.0, "cl": 1.0 },
///         "protocol": { "schedule": { "kind": "constant", "rate": 5.0 }, "time_span": 5.0 }
///     }]
/// }"#)?;
/// let solution = study.into_solution()?;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    #[serde(default)]
    pub solver: SolverOptions,
    #[serde(default)]
    pub pairs: Vec<PairConfig>,
}

impl FromStr for StudyConfig {
    type Err = PkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl StudyConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PkError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        content.parse()
    }

    pub fn to_json(&self) -> Result<String, PkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a [Solution] holding every pair of the study, in file order
    pub fn into_solution(self) -> Result<Solution, PkError> {
        let mut solution = Solution::with_options(self.solver)?;
        for (i, pair) in self.pairs.into_iter().enumerate() {
            let model = Model::try_from(pair.model).map_err(|e| annotate(e, i))?;
            let protocol = Protocol::try_from(pair.protocol).map_err(|e| annotate(e, i))?;
            solution.add(model, protocol)?;
        }
        tracing::debug!(pairs = solution.len(), "loaded study");
        Ok(solution)
    }
}

fn annotate(err: PkError, index: usize) -> PkError {
    match err {
        PkError::Validation(msg) => PkError::Validation(format!("pair {}: {}", index, msg)),
        PkError::Configuration(msg) => {
            PkError::Configuration(format!("pair {}: {}", index, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDY: &str = r#"{
        "solver": { "rtol": 1e-5, "atol": 1e-7 },
        "pairs": [
            {
                "model": { "route": "iv", "v_c": 10.0, "cl": 1.0,
                           "peripherals": [{ "volume": 5.0, "clearance": 2.0 }] },
                "protocol": { "schedule": { "kind": "constant", "rate": 5.0 }, "time_span": 5.0 }
            },
            {
                "model": { "route": "subcutaneous", "v_c": 2.0, "cl": 0.5, "k_a": 1.2 },
                "protocol": { "initial_dose": 3.0, "time_span": 24.0,
                              "schedule": { "kind": "periodic", "start": 0.0, "period": 12.0,
                                            "duration": 1.0, "rate": 2.0 } }
            }
        ]
    }"#;

    #[test]
    fn parses_study() {
        let study: StudyConfig = STUDY.parse().unwrap();
        assert_eq!(study.solver.rtol, 1e-5);
        assert_eq!(study.pairs.len(), 2);
        assert_eq!(study.pairs[1].model.k_a, Some(1.2));

        let solution = study.into_solution().unwrap();
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.options().atol, 1e-7);
    }

    #[test]
    fn unknown_route_is_a_configuration_error() {
        let json = r#"{ "pairs": [ {
            "model": { "route": "oral", "v_c": 1.0 },
            "protocol": { "time_span": 1.0 }
        } ] }"#;
        let study: StudyConfig = json.parse().unwrap();
        let err = study.into_solution().unwrap_err();
        assert!(matches!(err, PkError::Configuration(ref msg) if msg.starts_with("pair 0")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = r#"{ "pears": [] }"#.parse::<StudyConfig>().unwrap_err();
        assert!(matches!(err, PkError::Json(_)));
    }

    #[test]
    fn model_round_trip() {
        let model = Model::builder(DeliveryRoute::Subcutaneous)
            .v_c(3.0)
            .cl(0.2)
            .k_a(0.8)
            .peripheral(1.0, 0.5)
            .build()
            .unwrap();
        let config = ModelConfig::from(&model);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(Model::try_from(parsed).unwrap(), model);
    }

    #[test]
    fn study_to_json_and_back() {
        let study: StudyConfig = STUDY.parse().unwrap();
        let json = study.to_json().unwrap();
        let again: StudyConfig = json.parse().unwrap();
        assert_eq!(
            serde_json::to_value(&study).unwrap(),
            serde_json::to_value(&again).unwrap()
        );
    }

    #[test]
    fn missing_file() {
        let err = StudyConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PkError::Io(_)));
    }
}
