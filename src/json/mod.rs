//! JSON study files
//!
//! A study file lists the solver settings and the model/protocol pairs to simulate:
//!
//! ```json
//! {
//!   "solver": { "rtol": 1e-6, "atol": 1e-8 },
//!   "pairs": [
//!     {
//!       "model": { "route": "iv", "v_c": 10.0, "cl": 1.0,
//!                  "peripherals": [{ "volume": 5.0, "clearance": 2.0 }] },
//!       "protocol": { "schedule": { "kind": "constant", "rate": 5.0 },
//!                     "initial_dose": 0.0, "time_span": 24.0 }
//!     }
//!   ]
//! }
//! ```
//!
//! Dose schedules are tagged by `kind`: `none`, `constant`, `infusion` or `periodic`.
//! Custom dose functions cannot be expressed in a file.

pub mod model;

pub use model::{ModelConfig, PairConfig, ProtocolConfig, StudyConfig};
