//! Random number generation module, built on top of the "rand" crate that is
//! the Rust standard for RNGs, and the stochastic acceptance model which every
//! efficiency of the selection goes through.

mod standard;

use crate::numeric::Float;

pub use self::standard::RandGenerator as RandomGenerator;

/// Source of stochastic accept/reject decisions
///
/// Acceptance is decided by drawing a uniform number u in [0, 1[ and accepting
/// iff u < p. Hence p = 0 never accepts and p = 1 always accepts.
///
pub trait Sampler {
    /// Draw a uniform random number in [0, 1[
    fn uniform(&mut self) -> Float;

    /// Accept with probability `probability`, consuming exactly one draw
    fn accept(&mut self, probability: Float) -> bool {
        self.uniform() < probability
    }
}

impl Sampler for RandomGenerator {
    fn uniform(&mut self) -> Float {
        self.random()
    }
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn uniform(&mut self) -> Float {
        (**self).uniform()
    }

    fn accept(&mut self, probability: Float) -> bool {
        (**self).accept(probability)
    }
}

/// Sampler which accepts everything, for deterministic selection tests
#[cfg(test)]
#[derive(Default)]
pub struct AlwaysAccept {
    /// Number of decisions which were requested
    pub draws: usize,
}
//
#[cfg(test)]
impl Sampler for AlwaysAccept {
    fn uniform(&mut self) -> Float {
        self.draws += 1;
        0.
    }

    fn accept(&mut self, _probability: Float) -> bool {
        self.draws += 1;
        true
    }
}

/// Sampler which always draws the same number
#[cfg(test)]
pub struct FixedDraw(pub Float);
//
#[cfg(test)]
impl Sampler for FixedDraw {
    fn uniform(&mut self) -> Float {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_probabilities() {
        let mut rng = RandomGenerator::seeded(42);
        for _ in 0..1000 {
            assert!(!rng.accept(0.));
            assert!(rng.accept(1.));
        }
        assert!(!FixedDraw(0.).accept(0.));
        assert!(FixedDraw(0.999).accept(1.));
        assert!(!FixedDraw(0.5).accept(0.5));
    }

    #[test]
    fn acceptance_rate_follows_probability() {
        let mut rng = RandomGenerator::seeded(7);
        let accepted = (0..100_000).filter(|_| rng.accept(0.3)).count();
        let rate = accepted as Float / 100_000.;
        assert!((rate - 0.3).abs() < 0.01, "rate was {rate}");
    }

    #[test]
    fn samplers_can_be_borrowed() {
        fn decide(mut sampler: impl Sampler) -> bool {
            sampler.accept(0.)
        }
        let mut always = AlwaysAccept::default();
        assert!(decide(&mut always));
        assert!(decide(&mut always));
        assert_eq!(always.draws, 2);
    }
}
