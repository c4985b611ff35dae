//! Mechanism to apply deterministic cuts to physics objects and events

use crate::{
    evclass::{Charge, Jet, Lepton},
    momentum::{self, Momentum},
    numeric::Float,
    region::SignalRegion,
};

/// Kinematic acceptance thresholds and object multiplicity requirements
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectCuts {
    /// Minimal lepton transverse momentum (GeV)
    pub lepton_pt_min: Float,

    /// Maximal lepton absolute pseudorapidity
    pub lepton_eta_max: Float,

    /// Minimal jet transverse momentum (GeV)
    pub jet_pt_min: Float,

    /// Maximal jet absolute pseudorapidity
    pub jet_eta_max: Float,

    /// Number of leptons which must survive each lepton selection step
    pub min_leptons: usize,

    /// Number of b-tagged candidates required by the b-tagging step
    pub min_b_tags: usize,
}
//
impl Default for ObjectCuts {
    fn default() -> Self {
        Self {
            lepton_pt_min: 20.,
            lepton_eta_max: 2.4,
            jet_pt_min: 40.,
            jet_eta_max: 2.4,
            min_leptons: 2,
            min_b_tags: 1,
        }
    }
}
//
impl ObjectCuts {
    /// Decide whether a lepton is within the kinematic acceptance
    pub fn keep_lepton(&self, lepton: &Lepton) -> bool {
        in_acceptance(&lepton.momentum, self.lepton_pt_min, self.lepton_eta_max)
    }

    /// Decide whether a jet is within the kinematic acceptance
    pub fn keep_jet(&self, jet: &Jet) -> bool {
        in_acceptance(&jet.momentum, self.jet_pt_min, self.jet_eta_max)
    }

    /// Truth that enough leptons survived a lepton selection step
    pub fn enough_leptons(&self, leptons: &[Lepton]) -> bool {
        leptons.len() >= self.min_leptons
    }
}

fn in_acceptance(p: &Momentum, pt_min: Float, eta_max: Float) -> bool {
    momentum::pt(p) >= pt_min && momentum::eta(p).abs() < eta_max
}

/// Shared charge of a lepton pair, if the pair is same-sign
pub fn same_sign_charge(pair: &[Lepton; 2]) -> Option<Charge> {
    (pair[0].charge == pair[1].charge).then_some(pair[0].charge)
}

/// Truth that a signal region accepts lepton pairs of a given charge
pub fn charge_allowed(region: &SignalRegion, charge: Charge) -> bool {
    match charge {
        Charge::Plus => region.plus_plus,
        Charge::Minus => region.minus_minus,
    }
}

/// Truth that an event has enough selected jets for a signal region
pub fn enough_jets(region: &SignalRegion, num_jets: usize) -> bool {
    num_jets >= region.min_jets
}

/// Truth that an event has enough b-tagged jets for a signal region
pub fn enough_b_jets(region: &SignalRegion, num_b_jets: usize) -> bool {
    num_b_jets >= region.min_b_jets
}
