pub mod builder;
pub mod model;
pub mod protocol;
pub use builder::ModelBuilder;
pub use model::{DeliveryRoute, Model, Peripheral, PkModel};
pub use protocol::{DoseFn, DoseSchedule, DosingProtocol, Protocol};
