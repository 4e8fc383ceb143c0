//! Multi-compartment pharmacokinetic models.
//!
//! A [Model] describes the compartments (a central compartment, optional peripheral
//! compartments and, for subcutaneous delivery, an absorption compartment), a [Protocol]
//! describes how the drug is given, and a [Solution] holds model/protocol pairs and
//! integrates the resulting ODE system.
//!
//! ```ignore
//! use pkmodel::prelude::*;
//!
//! let model = Model::builder(DeliveryRoute::Intravenous)
//!     .v_c(10.0)
//!     .cl(1.0)
//!     .peripheral(5.0, 2.0)
//!     .build()?;
//! let protocol = Protocol::new(DoseSchedule::Constant { rate: 5.0 }, 0.0, 24.0)?;
//!
//! let mut solution = Solution::new();
//! solution.add(model, protocol)?;
//! let central = solution.solve_pair(0, &[0.0, 1.0, 2.0, 4.0, 8.0, 24.0])?;
//! ```

pub mod data;
pub mod error;
pub mod json;
pub mod plot;
pub mod simulator;

pub use crate::data::*;
pub use crate::json::StudyConfig;
pub use crate::plot::{CsvRenderer, Figure, Layout, Renderer, Series};
pub use crate::simulator::{
    derivative, solve, solve_states, transfer, PairId, Solution, SolverOptions, Trajectory,
};
pub use error::PkError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            DeliveryRoute, DoseSchedule, DosingProtocol, Model, ModelBuilder, Peripheral, PkModel,
            Protocol,
        };
    }
    pub mod simulator {
        pub use crate::simulator::{
            derivative, equation::CompartmentSystem, equation::StateLayout, solution::Pair,
            solve, solve_states, transfer, PairId, Solution, SolverOptions, Trajectory,
        };
    }

    pub use crate::data::*;
    pub use crate::json::StudyConfig;
    pub use crate::plot::{CsvRenderer, Figure, Layout, Renderer, Series};
    pub use crate::simulator::{solve, solve_states, PairId, Solution, SolverOptions, Trajectory};
    pub use crate::PkError;
}
