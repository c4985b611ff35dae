//! This module implements some domain-specific 4-momentum handling logic.
//!
//! Everything the selection needs from relativistic kinematics lives here:
//! transverse momentum, pseudorapidity, azimuth and angular separation.

use crate::numeric::{floats::consts::PI, Float};
use nalgebra::SVector;
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Pseudorapidity reported for particles travelling along the beam axis
///
/// Such particles have no transverse momentum, so their pseudorapidity is
/// formally infinite. We follow the usual convention of clamping it to a
/// huge value, which keeps comparisons meaningful.
pub const BEAM_AXIS_ETA: Float = 1e5;

/// Build a 4-momentum from its components
pub fn new(px: Float, py: Float, pz: Float, e: Float) -> Momentum {
    Momentum::new(px, py, pz, e)
}

/// Transverse momentum
pub fn pt(p: &Momentum) -> Float {
    sqrt(p[X].powi(2) + p[Y].powi(2))
}

/// Pseudorapidity
pub fn eta(p: &Momentum) -> Float {
    let pt = pt(p);
    if pt == 0. {
        if p[Z] >= 0. {
            BEAM_AXIS_ETA
        } else {
            -BEAM_AXIS_ETA
        }
    } else {
        (p[Z] / pt).asinh()
    }
}

/// Azimuthal angle, in ]-pi, pi]
pub fn phi(p: &Momentum) -> Float {
    p[Y].atan2(p[X])
}

/// Angular separation in the (eta, phi) plane
pub fn delta_r(p1: &Momentum, p2: &Momentum) -> Float {
    let d_eta = eta(p1) - eta(p2);
    let mut d_phi = abs(phi(p1) - phi(p2));
    if d_phi > PI {
        d_phi = 2. * PI - d_phi;
    }
    sqrt(d_eta.powi(2) + d_phi.powi(2))
}

/// Build the 4-momentum of a massless particle from collider coordinates
#[cfg(test)]
pub fn from_pt_eta_phi(pt: Float, eta: Float, phi: Float) -> Momentum {
    let (px, py, pz) = (pt * phi.cos(), pt * phi.sin(), pt * eta.sinh());
    new(px, py, pz, sqrt(px.powi(2) + py.powi(2) + pz.powi(2)))
}
