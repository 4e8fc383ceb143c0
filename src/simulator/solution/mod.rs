//! Registry of model/protocol pairs and the driver that solves them.

mod trajectory;

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::data::{protocol::linspace, DosingProtocol, PkModel};
use crate::plot::{Figure, Layout, Series, MAX_SIDE_BY_SIDE};
use crate::simulator::SolverOptions;
use crate::PkError;

pub use trajectory::Trajectory;

/// Stable handle of a registered pair.
///
/// Unlike positional indices, a handle keeps pointing at the same pair when other pairs are
/// removed, and is never handed out twice by the same [Solution].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId(u64);

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pair #{}", self.0)
    }
}

/// A model and the protocol it is simulated with. Always added and removed together.
#[derive(Debug, Clone)]
pub struct Pair {
    id: PairId,
    model: Arc<dyn PkModel>,
    protocol: Arc<dyn DosingProtocol>,
}

impl Pair {
    pub fn id(&self) -> PairId {
        self.id
    }

    pub fn model(&self) -> &dyn PkModel {
        self.model.as_ref()
    }

    pub fn protocol(&self) -> &dyn DosingProtocol {
        self.protocol.as_ref()
    }

    pub fn into_parts(self) -> (Arc<dyn PkModel>, Arc<dyn DosingProtocol>) {
        (self.model, self.protocol)
    }
}

/// Holds model/protocol pairs and solves them.
///
/// Pairs are addressed either by position, in registration order, or by the [PairId]
/// returned from [Solution::add]. Positions shift when an earlier pair is removed.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pairs: Vec<Pair>,
    next_id: u64,
    options: SolverOptions,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SolverOptions) -> Result<Self, PkError> {
        options.validate()?;
        Ok(Self {
            options,
            ..Default::default()
        })
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SolverOptions) -> Result<(), PkError> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Register a model/protocol pair. Both are validated before anything is stored.
    pub fn add<Mo, P>(&mut self, model: Mo, protocol: P) -> Result<PairId, PkError>
    where
        Mo: PkModel + 'static,
        P: DosingProtocol + 'static,
    {
        self.add_shared(Arc::new(model), Arc::new(protocol))
    }

    /// Register a pair whose model and protocol may be shared with other pairs
    pub fn add_shared(
        &mut self,
        model: Arc<dyn PkModel>,
        protocol: Arc<dyn DosingProtocol>,
    ) -> Result<PairId, PkError> {
        model.validate()?;
        protocol.validate()?;
        let id = PairId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, route = %model.route(), index = self.pairs.len(), "adding pair");
        self.pairs.push(Pair {
            id,
            model,
            protocol,
        });
        Ok(id)
    }

    /// Remove the pair at `index`. On error the registry is left untouched.
    pub fn remove(&mut self, index: usize) -> Result<Pair, PkError> {
        if index >= self.pairs.len() {
            return Err(PkError::IndexOutOfBounds {
                index,
                len: self.pairs.len(),
            });
        }
        let pair = self.pairs.remove(index);
        tracing::debug!(id = %pair.id, index, "removed pair");
        Ok(pair)
    }

    pub fn remove_by_id(&mut self, id: PairId) -> Result<Pair, PkError> {
        let index = self.index_of(id).ok_or(PkError::UnknownPair(id))?;
        self.remove(index)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    pub fn get_by_id(&self, id: PairId) -> Option<&Pair> {
        self.pairs.iter().find(|pair| pair.id == id)
    }

    /// Current position of the pair with handle `id`
    pub fn index_of(&self, id: PairId) -> Option<usize> {
        self.pairs.iter().position(|pair| pair.id == id)
    }

    /// The registered pairs, in registration order
    pub fn list_pairs(&self) -> impl Iterator<Item = (&dyn PkModel, &dyn DosingProtocol)> + '_ {
        self.pairs.iter().map(|pair| (pair.model(), pair.protocol()))
    }

    pub fn models(&self) -> impl Iterator<Item = &dyn PkModel> + '_ {
        self.pairs.iter().map(Pair::model)
    }

    pub fn protocols(&self) -> impl Iterator<Item = &dyn DosingProtocol> + '_ {
        self.pairs.iter().map(Pair::protocol)
    }

    /// Central compartment quantity of `model` under `protocol` at every time point
    pub fn solve<Mo, P>(
        &self,
        model: &Mo,
        protocol: &P,
        time_points: &[f64],
    ) -> Result<Vec<f64>, PkError>
    where
        Mo: PkModel + ?Sized,
        P: DosingProtocol + ?Sized,
    {
        crate::simulator::solve(model, protocol, time_points, &self.options)
    }

    /// Quantities of every compartment of `model` under `protocol` at every time point
    pub fn solve_states<Mo, P>(
        &self,
        model: &Mo,
        protocol: &P,
        time_points: &[f64],
    ) -> Result<Trajectory, PkError>
    where
        Mo: PkModel + ?Sized,
        P: DosingProtocol + ?Sized,
    {
        crate::simulator::solve_states(model, protocol, time_points, &self.options)
    }

    /// Solve the registered pair at `index`
    pub fn solve_pair(&self, index: usize, time_points: &[f64]) -> Result<Vec<f64>, PkError> {
        let pair = self.get(index).ok_or(PkError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;
        self.solve(pair.model(), pair.protocol(), time_points)
    }

    /// Solve every pair over `time_res` evenly spaced points of its protocol's time span.
    ///
    /// Pairs are solved in parallel; the result keeps registration order and holds
    /// `(time_points, central_quantity)` for each pair.
    pub fn solve_all(&self, time_res: usize) -> Result<Vec<(Vec<f64>, Vec<f64>)>, PkError> {
        self.pairs
            .par_iter()
            .map(|pair| {
                let times = linspace(0.0, pair.protocol().time_span(), time_res);
                let values = self.solve(pair.model(), pair.protocol(), &times)?;
                Ok::<_, PkError>((times, values))
            })
            .collect()
    }

    /// Solve every pair and arrange the central compartment curves in a [Figure]
    pub fn visualise(&self, layout: Layout, time_res: usize) -> Result<Figure, PkError> {
        if layout == Layout::SideBySide && self.len() > MAX_SIDE_BY_SIDE {
            return Err(PkError::validation(format!(
                "side by side figures support at most {} pairs, the solution holds {}",
                MAX_SIDE_BY_SIDE,
                self.len()
            )));
        }
        let series = self
            .solve_all(time_res)?
            .into_iter()
            .zip(self.pairs.iter())
            .map(|((times, values), pair)| {
                Series::new(
                    format!("{} ({})", pair.id, pair.model().route()),
                    times,
                    values,
                )
            })
            .collect();
        Figure::new(layout, series)
    }
}
