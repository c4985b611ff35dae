//! This module defines the properties and storage of generated events

use crate::momentum::Momentum;

/// Species code (PDG Monte Carlo numbering scheme) of the electron
pub const ELECTRON: i32 = 11;

/// Species code of the muon
pub const MUON: i32 = 13;

/// Species code of the bottom quark
pub const BOTTOM: i32 = 5;

/// Species code of the charm quark
pub const CHARM: i32 = 4;

/// Species codes which leave no trace in the detector
///
/// Neutrinos, the lightest neutralino and the gravitino.
const INVISIBLE_SPECIES: [i32; 5] = [12, 14, 16, 1000022, 1000039];

/// Truth that a species code designates a bottom quark
pub fn is_bottom_species(pdg_id: i32) -> bool {
    pdg_id.abs() == BOTTOM
}

/// Truth that a species code designates something the detector can see
pub fn is_visible_species(pdg_id: i32) -> bool {
    !INVISIBLE_SPECIES.contains(&pdg_id.abs())
}

/// Generated particle, as handed over by the event generator
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Signed species code
    pub pdg_id: i32,

    /// Truth that this particle is part of the final state
    pub is_final: bool,

    /// Truth that this particle interacts with the detector
    pub is_visible: bool,

    /// 4-momentum (GeV)
    pub momentum: Momentum,
}
//
impl Particle {
    /// Build a final-state particle, deriving visibility from its species
    pub fn final_state(pdg_id: i32, momentum: Momentum) -> Self {
        Self {
            pdg_id,
            is_final: true,
            is_visible: is_visible_species(pdg_id),
            momentum,
        }
    }
}

/// Storage for one generated event
///
/// The hard-process record is only filled in by generators which are able to
/// expose it, and is only needed for parton-level b-tagging.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Full event record
    pub particles: Vec<Particle>,

    /// Particles of the primary hard scattering, if available
    pub hard_process: Option<Vec<Particle>>,
}
//
impl Event {
    /// Build an event from its full particle record
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            hard_process: None,
        }
    }

    /// Attach the hard-process record to this event
    pub fn with_hard_process(mut self, hard_process: Vec<Particle>) -> Self {
        self.hard_process = Some(hard_process);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum;

    #[test]
    fn species_helpers() {
        assert!(is_bottom_species(-5) && !is_bottom_species(4));
        assert!(!is_visible_species(-12) && !is_visible_species(1000022));
        assert!(is_visible_species(21));
    }

    #[test]
    fn final_state_particles_know_their_visibility() {
        let p = momentum::new(1., 2., 3., 4.);
        assert!(Particle::final_state(11, p).is_visible);
        assert!(!Particle::final_state(14, p).is_visible);
    }
}
