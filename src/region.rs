//! Signal regions: the named sets of thresholds which define a search channel

use crate::{numeric::Float, Result};

use eyre::{ensure, format_err};

/// Thresholds of a signal region
///
/// See table 2 of CMS-PAS-SUS-12-017, which the default table follows.
///
#[derive(Clone, Debug, PartialEq)]
pub struct SignalRegion {
    /// Short name of the region, for display purposes
    pub name: &'static str,

    /// Minimal number of selected jets
    pub min_jets: usize,

    /// Minimal number of b-tagged jets
    pub min_b_jets: usize,

    /// Minimal missing transverse momentum (GeV)
    pub min_met: Float,

    /// Minimal scalar sum of jet transverse momenta (GeV)
    pub min_ht: Float,

    /// Truth that positively charged lepton pairs are accepted
    pub plus_plus: bool,

    /// Truth that negatively charged lepton pairs are accepted
    pub minus_minus: bool,
}
//
impl SignalRegion {
    /// Check that this region can select anything at all
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.plus_plus || self.minus_minus,
            "Signal region {} accepts neither ++ nor -- lepton pairs",
            self.name
        );
        ensure!(
            self.min_met.is_finite() && self.min_met >= 0.,
            "Signal region {} has an invalid MET threshold ({})",
            self.name,
            self.min_met
        );
        ensure!(
            self.min_ht.is_finite() && self.min_ht >= 0.,
            "Signal region {} has an invalid HT threshold ({})",
            self.name,
            self.min_ht
        );
        Ok(())
    }
}

/// Index of the signal region which is used when none is specified
pub const DEFAULT_REGION_INDEX: usize = 8;

/// Ordered, validated collection of signal regions
///
/// Built once before the event loop and only read afterwards.
///
#[derive(Clone, Debug)]
pub struct SignalRegionTable(Box<[SignalRegion]>);
//
impl SignalRegionTable {
    /// Build a table from a list of regions, checking each of them
    pub fn new(regions: Vec<SignalRegion>) -> Result<Self> {
        ensure!(!regions.is_empty(), "A signal region table cannot be empty");
        for region in &regions {
            region.validate()?;
        }
        Ok(Self(regions.into_boxed_slice()))
    }

    /// Signal regions of the CMS same-sign dilepton + b-jets search
    pub fn same_sign_dilepton() -> Result<Self> {
        #[rustfmt::skip]
        let regions = [
            // name, jets, b-jets, MET, HT, ++, --
            ("SR0", 2, 2,   0.,  80., true,  true),
            ("SR1", 2, 2,  30.,  80., true,  true),
            ("SR2", 2, 2,  30.,  80., true,  false),
            ("SR3", 4, 2, 120., 200., true,  true),
            ("SR4", 4, 2,  50., 200., true,  true),
            ("SR5", 4, 2,  50., 320., true,  true),
            ("SR6", 4, 2, 120., 320., true,  true),
            ("SR7", 3, 3,  50., 200., true,  true),
            ("SR8", 4, 2,   0., 320., true,  true),
        ];
        Self::new(
            regions
                .into_iter()
                .map(
                    |(name, min_jets, min_b_jets, min_met, min_ht, plus_plus, minus_minus)| {
                        SignalRegion {
                            name,
                            min_jets,
                            min_b_jets,
                            min_met,
                            min_ht,
                            plus_plus,
                            minus_minus,
                        }
                    },
                )
                .collect(),
        )
    }

    /// Number of regions in the table
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a signal region by index
    pub fn get(&self, index: usize) -> Result<&SignalRegion> {
        self.0.get(index).ok_or_else(|| {
            format_err!(
                "Signal region index {} is out of range (there are {} regions)",
                index,
                self.len()
            )
        })
    }
}
