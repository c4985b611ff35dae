//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

// Floating-point precision is configured here
pub type Float = f64;
pub use std::f64 as floats;

/// Mathematical functions
pub mod functions {
    use super::{floats::consts::SQRT_2, Float};

    /// Gauss error function
    pub fn erf(x: Float) -> Float {
        statrs::function::erf::erf(x)
    }

    /// Cumulative distribution of a gaussian of given mean and width,
    /// which is the shape of every threshold turn-on curve in this program
    pub fn gaussian_cdf(x: Float, mean: Float, sigma: Float) -> Float {
        0.5 * (1. + erf((x - mean) / (SQRT_2 * sigma)))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn erf_is_odd_and_saturates() {
            assert_eq!(erf(0.), 0.);
            assert!((erf(1.) + erf(-1.)).abs() < 1e-12);
            assert!(erf(6.) > 0.999_999);
        }

        #[test]
        fn gaussian_cdf_midpoint() {
            assert!((gaussian_cdf(120., 120., 25.) - 0.5).abs() < 1e-12);
            assert!(gaussian_cdf(0., 120., 25.) < 1e-5);
            assert!(gaussian_cdf(300., 120., 25.) > 1. - 1e-5);
        }
    }
}
