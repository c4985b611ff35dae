//! This module contains everything that is needed to present the final
//! results of a selection run: the labelled cutflow and the efficiency

use crate::{
    cutflow::{CutflowCounters, Stage},
    evcut::ObjectCuts,
    numeric::Float,
    pipeline::PipelineVariant,
    region::SignalRegion,
};

/// How the event loop came to an end
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Termination {
    /// Every requested event was generated
    Completed,

    /// The generator failed more often than the abort budget allows
    TooManyAborts,

    /// The event source ran out of events
    Exhausted,
}

/// Final results of the selection
#[derive(Clone, Debug)]
pub struct FinalResults<'regions> {
    /// Number of events which reached each stage
    pub counters: CutflowCounters,

    /// Number of events which were requested from the generator
    pub requested_events: usize,

    /// Number of failed generation attempts
    pub num_aborts: usize,

    /// Reason why the event loop stopped
    pub termination: Termination,

    /// Flavor of selection which was run
    pub variant: PipelineVariant,

    /// Index of the signal region in its table
    pub region_index: usize,

    /// Signal region in which events were selected
    pub region: &'regions SignalRegion,

    /// Object selection thresholds (for labelling)
    pub object_cuts: ObjectCuts,
}
//
impl FinalResults<'_> {
    /// Fraction of the requested events which passed every cut
    ///
    /// The denominator is the number of requested events, even if the run
    /// ended early, so that early termination shows up as lost efficiency.
    ///
    pub fn efficiency(&self) -> Float {
        self.counters.count(Stage::Passed) as Float / self.requested_events as Float
    }

    /// Labelled cutflow, in stage order
    pub fn rows(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        self.counters
            .iter()
            .map(move |(stage, count)| (stage_label(stage, self.region, &self.object_cuts), count))
    }

    /// Display the results on stdout
    pub fn print(&self, timestamp: &str) {
        println!();
        println!(
            "Cutflow of the {} selection in signal region {} ({}), {}",
            self.variant, self.region_index, self.region.name, timestamp
        );
        for (label, count) in self.rows() {
            println!("{:<40}: {}", label, count);
        }
        println!("{:<40}: {}", "efficiency", self.efficiency());
        match self.termination {
            Termination::Completed => {}
            Termination::TooManyAborts => println!(
                "WARNING: run aborted after {} generator failures",
                self.num_aborts
            ),
            Termination::Exhausted => println!("WARNING: event source ran out of events"),
        }
    }
}

/// Human-readable description of a stage, embedding the active thresholds
pub fn stage_label(stage: Stage, region: &SignalRegion, cuts: &ObjectCuts) -> String {
    match stage {
        Stage::Generated => "Generated events".to_owned(),
        Stage::KinematicOk => format!(
            "at least {} leptons with pT >= {} GeV, |eta| < {}",
            cuts.min_leptons, cuts.lepton_pt_min, cuts.lepton_eta_max
        ),
        Stage::IdOk => format!("at least {} identified leptons", cuts.min_leptons),
        Stage::IsoOk => format!("at least {} isolated leptons", cuts.min_leptons),
        Stage::BTagOk => format!("at least {} b-tagged jets", cuts.min_b_tags),
        Stage::ExactlyTwoLeptons => "exactly two leptons".to_owned(),
        Stage::TriggerOk => "triggered two leptons".to_owned(),
        Stage::SameSign => "same sign dileptons".to_owned(),
        Stage::JetsOk => format!("at least {} jets", region.min_jets),
        Stage::BJetsOk => format!("at least {} b jets", region.min_b_jets),
        Stage::MetOk => format!("at least {} GeV MET", region.min_met),
        Stage::HtOk => format!("at least {} GeV HT", region.min_ht),
        Stage::ChargeOk => match (region.plus_plus, region.minus_minus) {
            (true, true) => "either ++ or -- leptons".to_owned(),
            (true, false) => "only ++ leptons".to_owned(),
            (false, true) => "only -- leptons".to_owned(),
            (false, false) => "no allowed charge pattern".to_owned(),
        },
        Stage::Passed => "passed all cuts".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::SignalRegionTable;

    fn results(region: &SignalRegion, passed: usize, requested: usize) -> FinalResults<'_> {
        let mut counters = CutflowCounters::new();
        for _ in 0..passed {
            counters.record(Stage::Passed);
        }
        for _ in passed..requested {
            counters.record(Stage::SameSign);
        }
        FinalResults {
            counters,
            requested_events: requested,
            num_aborts: 0,
            termination: Termination::Completed,
            variant: PipelineVariant::Background,
            region_index: 8,
            region,
            object_cuts: ObjectCuts::default(),
        }
    }

    #[test]
    fn labels_embed_region_thresholds() {
        let table = SignalRegionTable::same_sign_dilepton().unwrap();
        let region = table.get(8).unwrap();
        let cuts = ObjectCuts::default();
        assert_eq!(stage_label(Stage::JetsOk, region, &cuts), "at least 4 jets");
        assert_eq!(stage_label(Stage::BJetsOk, region, &cuts), "at least 2 b jets");
        assert_eq!(stage_label(Stage::MetOk, region, &cuts), "at least 0 GeV MET");
        assert_eq!(stage_label(Stage::HtOk, region, &cuts), "at least 320 GeV HT");
        assert_eq!(
            stage_label(Stage::ChargeOk, region, &cuts),
            "either ++ or -- leptons"
        );
        let plus_only = table.get(2).unwrap();
        assert_eq!(stage_label(Stage::ChargeOk, plus_only, &cuts), "only ++ leptons");
        assert_eq!(
            stage_label(Stage::KinematicOk, region, &cuts),
            "at least 2 leptons with pT >= 20 GeV, |eta| < 2.4"
        );
    }

    #[test]
    fn rows_follow_stage_order() {
        let table = SignalRegionTable::same_sign_dilepton().unwrap();
        let results = results(table.get(8).unwrap(), 3, 10);
        let rows = results.rows().collect::<Vec<_>>();
        assert_eq!(rows.len(), Stage::ALL.len());
        assert_eq!(rows[0], ("Generated events".to_owned(), 10));
        assert_eq!(rows[7], ("same sign dileptons".to_owned(), 10));
        assert_eq!(rows[8].1, 3);
        assert_eq!(rows.last(), Some(&("passed all cuts".to_owned(), 3)));
    }

    #[test]
    fn efficiency_uses_requested_events() {
        let table = SignalRegionTable::same_sign_dilepton().unwrap();
        let mut results = results(table.get(0).unwrap(), 1, 4);
        assert_eq!(results.efficiency(), 0.25);
        results.requested_events = 8;
        assert_eq!(results.efficiency(), 0.125);
    }
}
