//! Right-hand side of the compartment ODE system.
//!
//! The state vector is laid out as
//! - intravenous: `[central, peripheral_0, peripheral_1, ...]`
//! - subcutaneous: `[absorption, central, peripheral_0, peripheral_1, ...]`
//!
//! Every peripheral compartment exchanges drug with the central compartment through a flux
//! proportional to the concentration gradient between the two:
//! `flux_i = q_i * (x_c / v_c - x_i / v_i)`. The flux enters the peripheral compartment and
//! leaves the central one, so with zero clearance and no dosing the total quantity is conserved.

use nalgebra::DVector;

use crate::data::{DeliveryRoute, DosingProtocol, Peripheral, PkModel};
use crate::simulator::V;
use crate::PkError;

/// Positions of the compartments in the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    route: DeliveryRoute,
    nperipheral: usize,
}

impl StateLayout {
    pub fn new(route: DeliveryRoute, nperipheral: usize) -> Self {
        Self { route, nperipheral }
    }

    pub fn of<Mo: PkModel + ?Sized>(model: &Mo) -> Self {
        Self::new(model.route(), model.peripherals().len())
    }

    pub fn route(&self) -> DeliveryRoute {
        self.route
    }

    pub fn nstates(&self) -> usize {
        self.route.base_compartments() + self.nperipheral
    }

    pub fn nperipheral(&self) -> usize {
        self.nperipheral
    }

    #[inline(always)]
    pub fn central(&self) -> usize {
        self.route.central_index()
    }

    /// Index receiving the dose rate
    #[inline(always)]
    pub fn dose(&self) -> usize {
        self.route.dose_index()
    }

    pub fn absorption(&self) -> Option<usize> {
        match self.route {
            DeliveryRoute::Intravenous => None,
            DeliveryRoute::Subcutaneous => Some(0),
        }
    }

    #[inline(always)]
    pub fn peripheral_start(&self) -> usize {
        self.central() + 1
    }

    #[inline(always)]
    pub fn peripheral(&self, i: usize) -> usize {
        self.peripheral_start() + i
    }
}

/// The dose-independent part of the system: elimination, absorption and
/// inter-compartmental exchange. Linear in the state.
#[derive(Debug, Clone)]
pub struct Kinetics<'a> {
    layout: StateLayout,
    v_c: f64,
    cl: f64,
    k_a: f64,
    peripherals: &'a [Peripheral],
}

impl<'a> Kinetics<'a> {
    pub fn new<Mo: PkModel + ?Sized>(model: &'a Mo) -> Result<Self, PkError> {
        let layout = StateLayout::of(model);
        let k_a = match layout.route() {
            DeliveryRoute::Intravenous => 0.0,
            DeliveryRoute::Subcutaneous => model.k_a().ok_or_else(|| {
                PkError::configuration(
                    "subcutaneous delivery requires an absorption rate k_a",
                )
            })?,
        };
        model.validate()?;
        Ok(Self {
            layout,
            v_c: model.v_c(),
            cl: model.cl(),
            k_a,
            peripherals: model.peripherals(),
        })
    }

    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    /// Writes the dose-free derivative of `q` into `dq`.
    ///
    /// `q` and `dq` must both have [StateLayout::nstates] entries.
    #[inline]
    pub fn apply(&self, q: &[f64], dq: &mut [f64]) {
        let central = self.layout.central();
        let concentration = q[central] / self.v_c;

        let mut exchanged = 0.0;
        for (i, peripheral) in self.peripherals.iter().enumerate() {
            let index = self.layout.peripheral(i);
            let flux = peripheral.clearance * (concentration - q[index] / peripheral.volume);
            dq[index] = flux;
            exchanged += flux;
        }
        dq[central] = -concentration * self.cl - exchanged;

        if let Some(absorption) = self.layout.absorption() {
            let absorbed = self.k_a * q[absorption];
            dq[absorption] = -absorbed;
            dq[central] += absorbed;
        }
    }
}

/// A model/protocol pair ready to be evaluated or integrated.
#[derive(Debug)]
pub struct CompartmentSystem<'a, P: ?Sized> {
    kinetics: Kinetics<'a>,
    protocol: &'a P,
}

impl<'a, P: DosingProtocol + ?Sized> CompartmentSystem<'a, P> {
    pub fn new<Mo: PkModel + ?Sized>(model: &'a Mo, protocol: &'a P) -> Result<Self, PkError> {
        let kinetics = Kinetics::new(model)?;
        protocol.validate()?;
        Ok(Self { kinetics, protocol })
    }

    pub fn layout(&self) -> StateLayout {
        self.kinetics.layout()
    }

    pub fn nstates(&self) -> usize {
        self.layout().nstates()
    }

    /// All compartments empty except the central one, which holds the initial dose
    pub fn initial_state(&self) -> V {
        let mut x = DVector::zeros(self.nstates());
        x[self.layout().central()] = self.protocol.initial_dose();
        x
    }

    /// Full derivative at `(q, t)`, dose rate included
    #[inline]
    pub fn rhs(&self, q: &[f64], t: f64, dq: &mut [f64]) {
        self.kinetics.apply(q, dq);
        dq[self.layout().dose()] += self.protocol.dose_rate(q, t);
    }

    /// Product of the Jacobian of the dose-free system with `v`.
    ///
    /// Dose rates that depend on the state are not differentiated; the Newton
    /// iterations only need an approximate Jacobian.
    #[inline]
    pub fn jac_mul(&self, v: &[f64], dq: &mut [f64]) {
        self.kinetics.apply(v, dq);
    }
}

fn check_len(q: &[f64], layout: StateLayout) -> Result<(), PkError> {
    if q.len() != layout.nstates() {
        return Err(PkError::validation(format!(
            "state vector has {} entries but the {} model needs {}",
            q.len(),
            layout.route(),
            layout.nstates()
        )));
    }
    Ok(())
}

/// Rate of change of every compartment quantity in `q` at time `t`.
pub fn derivative<Mo, P>(q: &[f64], t: f64, model: &Mo, protocol: &P) -> Result<Vec<f64>, PkError>
where
    Mo: PkModel + ?Sized,
    P: DosingProtocol + ?Sized,
{
    let system = CompartmentSystem::new(model, protocol)?;
    check_len(q, system.layout())?;
    let mut dq = vec![0.0; q.len()];
    system.rhs(q, t, &mut dq);
    Ok(dq)
}

/// Rate of change of `q` ignoring any dosing.
pub fn transfer<Mo>(q: &[f64], model: &Mo) -> Result<Vec<f64>, PkError>
where
    Mo: PkModel + ?Sized,
{
    let kinetics = Kinetics::new(model)?;
    check_len(q, kinetics.layout())?;
    let mut dq = vec![0.0; q.len()];
    kinetics.apply(q, &mut dq);
    Ok(dq)
}
