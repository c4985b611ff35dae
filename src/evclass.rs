//! Mechanism to sort the visible content of an event into physics objects

use crate::{
    event::{self, Event, Particle, ELECTRON, MUON},
    momentum::{self, Momentum},
    numeric::Float,
};

use num_traits::Zero;

/// Particles beyond this pseudorapidity escape down the beam pipe
pub const MAX_VISIBLE_ETA: Float = 5.0;

/// Electric charge of a lepton (never zero)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Charge {
    Plus,
    Minus,
}

/// Lepton flavors which the analysis can identify
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LeptonFlavor {
    Electron,
    Muon,
}

/// Identified electron or muon
#[derive(Clone, Debug, PartialEq)]
pub struct Lepton {
    pub flavor: LeptonFlavor,
    pub charge: Charge,
    pub momentum: Momentum,
}
//
impl Lepton {
    /// Interpret a particle as a lepton, if its species allows for it
    ///
    /// Particle codes are positive for negatively charged leptons (11 is the
    /// electron), so the charge has the opposite sign of the species code.
    ///
    pub fn from_particle(particle: &Particle) -> Option<Self> {
        let flavor = match particle.pdg_id.abs() {
            ELECTRON => LeptonFlavor::Electron,
            MUON => LeptonFlavor::Muon,
            _ => return None,
        };
        let charge = if particle.pdg_id > 0 {
            Charge::Minus
        } else {
            Charge::Plus
        };
        Some(Self {
            flavor,
            charge,
            momentum: particle.momentum,
        })
    }
}

/// Parton-level jet candidate
#[derive(Clone, Debug, PartialEq)]
pub struct Jet {
    /// Species code of the originating parton
    pub pdg_id: i32,

    /// 4-momentum (GeV)
    pub momentum: Momentum,
}
//
impl Jet {
    /// Truth that this jet originates from a bottom quark
    pub fn is_bottom(&self) -> bool {
        event::is_bottom_species(self.pdg_id)
    }
}

/// Physics objects extracted from one event
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedEvent {
    /// Visible electrons and muons
    pub leptons: Vec<Lepton>,

    /// Every other visible particle
    pub partons: Vec<Jet>,

    /// Bottom quarks from the hard process (parton-level b-tagging only)
    pub hard_b_partons: Vec<Jet>,

    /// Negative vector sum of all visible momenta
    pub missing_momentum: Momentum,

    /// Scalar sum of parton transverse momenta
    pub ht: Float,
}
//
impl ClassifiedEvent {
    /// Classify the visible content of an event
    ///
    /// If `hard_process_b_tagging` is set, the hard-process record of the event
    /// (if any) is scanned for bottom quarks as well.
    ///
    pub fn new(event: &Event, hard_process_b_tagging: bool) -> Self {
        let mut result = Self {
            leptons: Vec::new(),
            partons: Vec::new(),
            hard_b_partons: Vec::new(),
            missing_momentum: Momentum::zero(),
            ht: 0.,
        };

        for particle in event.particles.iter().filter(|p| is_detectable(p)) {
            result.missing_momentum -= particle.momentum;
            if let Some(lepton) = Lepton::from_particle(particle) {
                result.leptons.push(lepton);
            } else {
                result.ht += momentum::pt(&particle.momentum);
                result.partons.push(Jet {
                    pdg_id: particle.pdg_id,
                    momentum: particle.momentum,
                });
            }
        }

        if hard_process_b_tagging {
            if let Some(hard_process) = &event.hard_process {
                result.hard_b_partons = hard_process
                    .iter()
                    .filter(|p| is_detectable(p) && event::is_bottom_species(p.pdg_id))
                    .map(|p| Jet {
                        pdg_id: p.pdg_id,
                        momentum: p.momentum,
                    })
                    .collect();
            }
        }

        result
    }

    /// Missing transverse momentum
    pub fn met(&self) -> Float {
        momentum::pt(&self.missing_momentum)
    }
}

/// Truth that a particle could leave a trace in the detector
fn is_detectable(particle: &Particle) -> bool {
    particle.is_final
        && particle.is_visible
        && momentum::eta(&particle.momentum).abs() < MAX_VISIBLE_ETA
}
