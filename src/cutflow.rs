//! This module keeps track of how many events survive each selection stage

/// Selection stages, in the order in which they are applied
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Stage {
    Generated,
    KinematicOk,
    IdOk,
    IsoOk,
    BTagOk,
    ExactlyTwoLeptons,
    TriggerOk,
    SameSign,
    JetsOk,
    BJetsOk,
    MetOk,
    HtOk,
    ChargeOk,
    Passed,
}
//
impl Stage {
    /// Every stage, in selection order
    pub const ALL: [Stage; NUM_STAGES] = [
        Stage::Generated,
        Stage::KinematicOk,
        Stage::IdOk,
        Stage::IsoOk,
        Stage::BTagOk,
        Stage::ExactlyTwoLeptons,
        Stage::TriggerOk,
        Stage::SameSign,
        Stage::JetsOk,
        Stage::BJetsOk,
        Stage::MetOk,
        Stage::HtOk,
        Stage::ChargeOk,
        Stage::Passed,
    ];

    /// Position of the stage in the selection sequence
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Number of selection stages
pub const NUM_STAGES: usize = 14;

/// Cumulative event counts at each selection stage
///
/// Events are recorded by the last stage which they reached, which increments
/// that stage and all the stages before it. Counts can thus only go down along
/// the selection sequence.
///
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CutflowCounters {
    counts: [u64; NUM_STAGES],
}
//
impl CutflowCounters {
    /// Set up a blank cutflow
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event which made it up to `last_stage` (included)
    pub fn record(&mut self, last_stage: Stage) {
        for count in &mut self.counts[..=last_stage.index()] {
            *count += 1;
        }
    }

    /// Number of events which reached a given stage
    pub fn count(&self, stage: Stage) -> u64 {
        self.counts[stage.index()]
    }

    /// Iterate over (stage, count) pairs in selection order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, u64)> + '_ {
        Stage::ALL.iter().map(move |&stage| (stage, self.count(stage)))
    }
}
