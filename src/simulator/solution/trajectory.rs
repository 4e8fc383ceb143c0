use crate::simulator::{equation::StateLayout, M};

/// Quantities of every compartment sampled at the requested time points.
///
/// `states` has one row per compartment, in state-vector order, and one column per time point.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: M,
    layout: StateLayout,
}

impl Trajectory {
    pub(crate) fn new(times: Vec<f64>, states: M, layout: StateLayout) -> Self {
        Self {
            times,
            states,
            layout,
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &M {
        &self.states
    }

    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Quantity of compartment `index` at every time point
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.states.row(index).iter().copied().collect()
    }

    pub fn central(&self) -> Vec<f64> {
        self.row(self.layout.central())
    }

    /// Concentration in the central compartment, given its volume
    pub fn central_concentration(&self, v_c: f64) -> Vec<f64> {
        self.central().into_iter().map(|q| q / v_c).collect()
    }

    /// Quantity at the injection site, `None` for intravenous models
    pub fn absorption(&self) -> Option<Vec<f64>> {
        self.layout.absorption().map(|index| self.row(index))
    }

    /// Quantity of peripheral compartment `i`, `None` if it does not exist
    pub fn peripheral(&self, i: usize) -> Option<Vec<f64>> {
        (i < self.layout.nperipheral()).then(|| self.row(self.layout.peripheral(i)))
    }

    /// Sum over all compartments at every time point
    pub fn total(&self) -> Vec<f64> {
        self.states.row_sum().iter().copied().collect()
    }
}
