use crate::data::model::{DeliveryRoute, Model, Peripheral, PkModel};
use crate::PkError;

/// Fluent construction of a [Model].
///
/// ```ignore
/// let model = Model::builder(DeliveryRoute::Subcutaneous)
///     .v_c(10.0)
///     .cl(1.0)
///     .k_a(0.5)
///     .peripheral(5.0, 2.0)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    route: DeliveryRoute,
    v_c: f64,
    cl: f64,
    k_a: Option<f64>,
    peripherals: Vec<Peripheral>,
}

impl ModelBuilder {
    pub fn new(route: DeliveryRoute) -> Self {
        ModelBuilder {
            route,
            v_c: 1.0,
            cl: 0.0,
            k_a: None,
            peripherals: Vec::new(),
        }
    }

    /// Start from a route given by name, e.g. `"iv"` or `"sc"`
    pub fn from_route_str(route: &str) -> Result<Self, PkError> {
        Ok(Self::new(route.parse()?))
    }

    pub fn route(mut self, route: DeliveryRoute) -> Self {
        self.route = route;
        self
    }

    pub fn v_c(mut self, v_c: f64) -> Self {
        self.v_c = v_c;
        self
    }

    pub fn cl(mut self, cl: f64) -> Self {
        self.cl = cl;
        self
    }

    pub fn k_a(mut self, k_a: f64) -> Self {
        self.k_a = Some(k_a);
        self
    }

    /// Append a peripheral compartment with volume `volume` and
    /// inter-compartmental clearance `clearance`
    pub fn peripheral(mut self, volume: f64, clearance: f64) -> Self {
        self.peripherals.push(Peripheral::new(volume, clearance));
        self
    }

    /// Append `n` identical peripheral compartments
    pub fn repeat_peripheral(mut self, n: usize, volume: f64, clearance: f64) -> Self {
        for _ in 0..n {
            self = self.peripheral(volume, clearance);
        }
        self
    }

    pub fn build(self) -> Result<Model, PkError> {
        let model = Model::from_parts(self.route, self.v_c, self.cl, self.k_a, self.peripherals);
        model.validate()?;
        Ok(model)
    }
}
