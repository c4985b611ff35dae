//! Parametrized detector efficiencies
//!
//! We do not simulate the detector. Instead, each reconstruction step is given
//! a probability of success that depends on the kinematics of the objects
//! involved, and the selection rolls the dice against it. The functions of this
//! module only compute probabilities, the dice live in the random module.

use crate::{
    evclass::{Jet, Lepton, LeptonFlavor},
    event::{BOTTOM, CHARM},
    momentum,
    numeric::{functions::*, Float},
};

/// Efficiency curve which rises from an onset value towards a plateau
///
/// eff(pT) = plateau * erf((pT - onset) / width)
///         + at_onset * (1 - erf((pT - onset) / width))
///
#[derive(Clone, Debug, PartialEq)]
pub struct PtTurnOn {
    /// Efficiency for very energetic objects
    pub plateau: Float,

    /// Efficiency at (and below) the onset
    pub at_onset: Float,

    /// Transverse momentum where the curve starts rising (GeV)
    pub onset: Float,

    /// Scale over which the plateau is reached (GeV)
    pub width: Float,
}
//
impl PtTurnOn {
    /// Efficiency at a given transverse momentum
    pub fn probability(&self, pt: Float) -> Float {
        let rise = erf((pt - self.onset).max(0.) / self.width);
        self.plateau * rise + self.at_onset * (1. - rise)
    }
}

/// Isolation efficiency: a turn-on in pT, degraded close to jets
#[derive(Clone, Debug, PartialEq)]
pub struct IsolationModel {
    /// Efficiency of a lepton far away from any jet
    pub efficiency: PtTurnOn,

    /// Angular scale of the degradation near jets
    pub cone: Float,
}
//
impl IsolationModel {
    /// Efficiency of a lepton given the jets of the event
    pub fn probability(&self, lepton: &Lepton, jets: &[Jet]) -> Float {
        let base = self.efficiency.probability(momentum::pt(&lepton.momentum));
        let closest_jet = jets
            .iter()
            .map(|jet| momentum::delta_r(&lepton.momentum, &jet.momentum))
            .fold(Float::INFINITY, Float::min);
        if closest_jet.is_infinite() {
            base
        } else {
            base * (1. - (-(closest_jet / self.cone).powi(2)).exp())
        }
    }
}

/// Flavor-dependent b-tagging rates
#[derive(Clone, Debug, PartialEq)]
pub struct BTagRates {
    /// Tagging efficiency of bottom jets
    pub bottom: Float,

    /// Mistag rate of charm jets
    pub charm: Float,

    /// Mistag rate of light quark and gluon jets
    pub light: Float,

    /// Tracker acceptance, no jet is tagged beyond it
    pub eta_max: Float,
}
//
impl BTagRates {
    /// Probability that a jet gets tagged
    pub fn probability(&self, jet: &Jet) -> Float {
        if momentum::eta(&jet.momentum).abs() >= self.eta_max {
            return 0.;
        }
        match jet.pdg_id.abs() {
            BOTTOM => self.bottom,
            CHARM => self.charm,
            _ => self.light,
        }
    }
}

/// Dilepton trigger efficiencies, per flavor combination
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerRates {
    pub electron_electron: Float,
    pub muon_muon: Float,
    pub electron_muon: Float,
}
//
impl TriggerRates {
    /// Probability that a lepton pair fires the dilepton trigger
    pub fn probability(&self, pair: &[Lepton; 2]) -> Float {
        use LeptonFlavor::*;
        match (pair[0].flavor, pair[1].flavor) {
            (Electron, Electron) => self.electron_electron,
            (Muon, Muon) => self.muon_muon,
            _ => self.electron_muon,
        }
    }
}

/// Smoothed threshold, modelling finite detector resolution
///
/// eff(x) = plateau * (1 + erf((x - threshold) / (sqrt(2) * resolution))) / 2
///
/// At threshold, the efficiency is half the plateau. A threshold which is not
/// positive is no requirement at all, and then always passes.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdTurnOn {
    /// Efficiency far above threshold
    pub plateau: Float,

    /// Detector resolution on the observable (GeV)
    pub resolution: Float,
}
//
impl ThresholdTurnOn {
    /// Efficiency of an event with observed value `value`
    pub fn probability(&self, value: Float, threshold: Float) -> Float {
        if threshold <= 0. {
            return 1.;
        }
        self.plateau * gaussian_cdf(value, threshold, self.resolution)
    }
}

/// Complete set of efficiencies used by the selection
#[derive(Clone, Debug, PartialEq)]
pub struct EfficiencyModel {
    pub electron_id: PtTurnOn,
    pub muon_id: PtTurnOn,
    pub electron_isolation: IsolationModel,
    pub muon_isolation: IsolationModel,
    pub b_tag: BTagRates,
    pub trigger: TriggerRates,
    pub met: ThresholdTurnOn,
    pub ht: ThresholdTurnOn,
}
//
impl EfficiencyModel {
    /// Identification efficiency of a lepton
    pub fn lepton_id(&self, lepton: &Lepton) -> Float {
        let curve = match lepton.flavor {
            LeptonFlavor::Electron => &self.electron_id,
            LeptonFlavor::Muon => &self.muon_id,
        };
        curve.probability(momentum::pt(&lepton.momentum))
    }

    /// Isolation efficiency of a lepton, given the selected jets
    pub fn lepton_isolation(&self, lepton: &Lepton, jets: &[Jet]) -> Float {
        match lepton.flavor {
            LeptonFlavor::Electron => self.electron_isolation.probability(lepton, jets),
            LeptonFlavor::Muon => self.muon_isolation.probability(lepton, jets),
        }
    }

    /// Probability to tag a b-jet candidate
    pub fn b_tag(&self, jet: &Jet) -> Float {
        self.b_tag.probability(jet)
    }

    /// Dilepton trigger efficiency
    pub fn trigger(&self, pair: &[Lepton; 2]) -> Float {
        self.trigger.probability(pair)
    }

    /// Efficiency of the missing transverse momentum requirement
    pub fn met(&self, met: Float, min_met: Float) -> Float {
        self.met.probability(met, min_met)
    }

    /// Efficiency of the hadronic activity requirement
    pub fn ht(&self, ht: Float, min_ht: Float) -> Float {
        self.ht.probability(ht, min_ht)
    }
}
//
impl Default for EfficiencyModel {
    /// Efficiencies of the CMS detector in the 2012 same-sign dilepton search
    fn default() -> Self {
        let lepton_curve = |plateau, at_onset| PtTurnOn {
            plateau,
            at_onset,
            onset: 10.,
            width: 30.,
        };
        Self {
            electron_id: lepton_curve(0.83, 0.70),
            muon_id: lepton_curve(0.94, 0.85),
            electron_isolation: IsolationModel {
                efficiency: lepton_curve(0.96, 0.84),
                cone: 0.3,
            },
            muon_isolation: IsolationModel {
                efficiency: lepton_curve(0.98, 0.88),
                cone: 0.3,
            },
            b_tag: BTagRates {
                bottom: 0.70,
                charm: 0.20,
                light: 0.01,
                eta_max: 2.4,
            },
            trigger: TriggerRates {
                electron_electron: 0.96,
                muon_muon: 0.93,
                electron_muon: 0.94,
            },
            met: ThresholdTurnOn {
                plateau: 1.,
                resolution: 25.,
            },
            ht: ThresholdTurnOn {
                plateau: 1.,
                resolution: 40.,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{evclass::Charge, momentum::from_pt_eta_phi};
    use proptest::prelude::*;

    fn lepton(flavor: LeptonFlavor, pt: Float, eta: Float, phi: Float) -> Lepton {
        Lepton {
            flavor,
            charge: Charge::Minus,
            momentum: from_pt_eta_phi(pt, eta, phi),
        }
    }

    fn jet(pdg_id: i32, eta: Float, phi: Float) -> Jet {
        Jet {
            pdg_id,
            momentum: from_pt_eta_phi(60., eta, phi),
        }
    }

    #[test]
    fn turn_on_is_half_plateau_at_threshold() {
        let model = EfficiencyModel::default();
        assert!((model.met(120., 120.) - 0.5).abs() < 1e-12);
        assert!((model.ht(300., 300.) - 0.5).abs() < 1e-12);
        assert!(model.met(20., 120.) < 1e-4);
        assert!(model.met(300., 120.) > 1. - 1e-4);
    }

    #[test]
    fn missing_threshold_always_passes() {
        let model = EfficiencyModel::default();
        assert_eq!(model.met(0., 0.), 1.);
        assert_eq!(model.ht(5., 0.), 1.);
    }

    #[test]
    fn lepton_id_rises_to_plateau() {
        let model = EfficiencyModel::default();
        let soft = model.lepton_id(&lepton(LeptonFlavor::Muon, 10., 0., 0.));
        let hard = model.lepton_id(&lepton(LeptonFlavor::Muon, 500., 0., 0.));
        assert!((soft - 0.85).abs() < 1e-12);
        assert!((hard - 0.94).abs() < 1e-6);
        let electron = model.lepton_id(&lepton(LeptonFlavor::Electron, 500., 0., 0.));
        assert!((electron - 0.83).abs() < 1e-6);
    }

    #[test]
    fn isolation_degrades_near_jets() {
        let model = EfficiencyModel::default();
        let l = lepton(LeptonFlavor::Electron, 100., 0., 0.);
        let alone = model.lepton_isolation(&l, &[]);
        let far = model.lepton_isolation(&l, &[jet(21, 0., 3.)]);
        let near = model.lepton_isolation(&l, &[jet(21, 0., 3.), jet(21, 0.1, 0.1)]);
        assert!(alone > 0.95);
        assert!((far - alone).abs() < 1e-6);
        assert!(near < 0.5 * alone);
        assert_eq!(model.lepton_isolation(&l, &[jet(21, 0., 0.)]), 0.);
    }

    #[test]
    fn b_tagging_depends_on_flavor_and_acceptance() {
        let model = EfficiencyModel::default();
        assert_eq!(model.b_tag(&jet(-5, 1., 0.)), 0.70);
        assert_eq!(model.b_tag(&jet(4, 1., 0.)), 0.20);
        assert_eq!(model.b_tag(&jet(21, 1., 0.)), 0.01);
        assert_eq!(model.b_tag(&jet(5, 2.6, 0.)), 0.);
    }

    #[test]
    fn trigger_depends_on_flavor_combination() {
        let model = EfficiencyModel::default();
        let e = lepton(LeptonFlavor::Electron, 30., 0., 0.);
        let mu = lepton(LeptonFlavor::Muon, 30., 0., 0.);
        assert_eq!(model.trigger(&[e.clone(), e.clone()]), 0.96);
        assert_eq!(model.trigger(&[mu.clone(), mu.clone()]), 0.93);
        assert_eq!(model.trigger(&[mu, e]), 0.94);
    }

    proptest! {
        #[test]
        fn turn_on_is_monotonic(
            threshold in 1.0..1000.0f64,
            x in 0.0..2000.0f64,
            dx in 0.0..500.0f64,
        ) {
            let model = EfficiencyModel::default();
            let p1 = model.met(x, threshold);
            let p2 = model.met(x + dx, threshold);
            prop_assert!((0.0..=1.0).contains(&p1));
            prop_assert!(p2 >= p1);
            let h1 = model.ht(x, threshold);
            let h2 = model.ht(x + dx, threshold);
            prop_assert!(h2 >= h1);
        }

        #[test]
        fn lepton_efficiencies_are_probabilities(
            pt in 0.0..3000.0f64,
            eta in -2.4..2.4f64,
            jet_phi in -3.0..3.0f64,
        ) {
            let model = EfficiencyModel::default();
            for flavor in [LeptonFlavor::Electron, LeptonFlavor::Muon] {
                let l = lepton(flavor, pt, eta, 0.);
                let id = model.lepton_id(&l);
                let iso = model.lepton_isolation(&l, &[jet(21, 0., jet_phi)]);
                prop_assert!((0.0..=1.0).contains(&id));
                prop_assert!((0.0..=1.0).contains(&iso));
            }
        }
    }
}
