//! The selection pipeline: pulls events one at a time from a generator, sorts
//! them into physics objects, and runs them through the ordered cut stages
//! while keeping track of how far each event made it.
//!
//! Signal, background and parton-level b-tagged signal selections only differ
//! in where the number of events comes from and in how b-jet candidates are
//! found, so they all go through the same code, parametrized by a
//! PipelineVariant.

use crate::{
    config::Configuration,
    cutflow::{CutflowCounters, Stage},
    efficiency::EfficiencyModel,
    evclass::{ClassifiedEvent, Jet, Lepton},
    evcut::{self, ObjectCuts},
    event::Event,
    evgen::{EventSource, Generated},
    random::Sampler,
    region::{SignalRegion, SignalRegionTable},
    resfin::{FinalResults, Termination},
    Result,
};

use eyre::{bail, ensure, format_err, Error};

use std::{fmt, str::FromStr};

/// Where the candidates for b-tagging come from
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BTagging {
    /// Selected jets which originate from a bottom quark
    DetectorLevel,

    /// Bottom quarks of the hard process
    PartonLevel,
}

/// Flavors of the selection pipeline
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PipelineVariant {
    /// Generator-level signal
    Signal,

    /// Background from an external event sample
    Background,

    /// Signal, with b-tagging performed on hard-process partons
    PartonBTagSignal,
}
//
impl PipelineVariant {
    /// How b-jet candidates are selected
    pub fn b_tagging(self) -> BTagging {
        match self {
            Self::Signal | Self::Background => BTagging::DetectorLevel,
            Self::PartonBTagSignal => BTagging::PartonLevel,
        }
    }

    /// Number of events which the selection should go through
    ///
    /// Signal runs are sized by the run configuration, whereas background
    /// runs go through the whole sample when it announces its size.
    ///
    pub fn requested_events(
        self,
        configured: Option<usize>,
        declared: Option<usize>,
    ) -> Result<usize> {
        let requested = match self {
            Self::Signal | Self::PartonBTagSignal => configured.ok_or_else(|| {
                format_err!("Main:numberOfEvents must be set for {} runs", self)
            })?,
            Self::Background => declared.or(configured).ok_or_else(|| {
                format_err!(
                    "The event sample does not announce its size, please set \
                     Main:numberOfEvents"
                )
            })?,
        };
        ensure!(requested > 0, "Please simulate at least one event");
        Ok(requested)
    }
}
//
impl FromStr for PipelineVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "signal" => Ok(Self::Signal),
            "background" => Ok(Self::Background),
            "signal-btag" => Ok(Self::PartonBTagSignal),
            _ => bail!(
                "Unknown pipeline variant {:?} (expected signal, background or signal-btag)",
                s
            ),
        }
    }
}
//
impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Signal => "signal",
            Self::Background => "background",
            Self::PartonBTagSignal => "signal-btag",
        };
        write!(f, "{}", name)
    }
}

/// What a run of the pipeline should do, as decided before the event loop
#[derive(Clone, Debug, PartialEq)]
pub struct RunPlan {
    /// Flavor of selection
    pub variant: PipelineVariant,

    /// Number of events to be requested from the generator
    pub requested_events: usize,

    /// Number of generation failures that are tolerated
    pub abort_budget: usize,
}
//
impl RunPlan {
    /// Plan a run given the configuration and the event source
    pub fn new(cfg: &Configuration, source: &impl EventSource) -> Result<Self> {
        let variant = cfg.variant;
        if variant.b_tagging() == BTagging::PartonLevel {
            ensure!(
                source.provides_hard_process(),
                "Parton-level b-tagging needs an event source which exposes the hard process"
            );
        }
        Ok(Self {
            variant,
            requested_events: variant.requested_events(cfg.num_events, source.declared_events())?,
            abort_budget: cfg.abort_budget,
        })
    }
}

/// Everything needed to select events in a given signal region
///
/// Owns its random stream, so that independent analyses do not share any
/// mutable state.
///
pub struct Analysis<'regions, S> {
    /// Index of the signal region in its table
    pub region_index: usize,

    /// Signal region in which events are selected
    pub region: &'regions SignalRegion,

    /// Kinematic acceptance of physics objects
    pub object_cuts: ObjectCuts,

    /// Detector efficiencies
    pub efficiencies: EfficiencyModel,

    /// Source of stochastic decisions
    pub sampler: S,
}
//
impl<'regions, S: Sampler> Analysis<'regions, S> {
    /// Set up an analysis in a signal region of a table
    pub fn new(table: &'regions SignalRegionTable, region_index: usize, sampler: S) -> Result<Self> {
        Ok(Self {
            region_index,
            region: table.get(region_index)?,
            object_cuts: ObjectCuts::default(),
            efficiencies: EfficiencyModel::default(),
            sampler,
        })
    }

    /// Run one event through the selection, telling the last stage it reached
    pub fn score_event(&mut self, event: &Event, b_tagging: BTagging) -> Stage {
        // Shorthands
        let cuts = &self.object_cuts;
        let eff = &self.efficiencies;
        let sampler = &mut self.sampler;
        let region = self.region;

        // Sort the event into physics objects
        let classified = ClassifiedEvent::new(event, b_tagging == BTagging::PartonLevel);
        let (met, ht) = (classified.met(), classified.ht);
        let ClassifiedEvent {
            leptons,
            partons,
            hard_b_partons,
            ..
        } = classified;

        // Lepton and jet kinematics
        let leptons = leptons
            .into_iter()
            .filter(|lepton| cuts.keep_lepton(lepton))
            .collect::<Vec<_>>();
        if !cuts.enough_leptons(&leptons) {
            return Stage::Generated;
        }
        let jets = partons
            .into_iter()
            .filter(|jet| cuts.keep_jet(jet))
            .collect::<Vec<_>>();

        // Lepton identification and isolation (roll the dice)
        let leptons = leptons
            .into_iter()
            .filter(|lepton| sampler.accept(eff.lepton_id(lepton)))
            .collect::<Vec<_>>();
        if !cuts.enough_leptons(&leptons) {
            return Stage::KinematicOk;
        }
        let leptons = leptons
            .into_iter()
            .filter(|lepton| sampler.accept(eff.lepton_isolation(lepton, &jets)))
            .collect::<Vec<Lepton>>();
        if !cuts.enough_leptons(&leptons) {
            return Stage::IdOk;
        }

        // b-tagging
        let b_candidates: Vec<Jet> = match b_tagging {
            BTagging::DetectorLevel => jets.iter().filter(|jet| jet.is_bottom()).cloned().collect(),
            BTagging::PartonLevel => hard_b_partons,
        };
        let num_b_jets = b_candidates
            .iter()
            .filter(|jet| sampler.accept(eff.b_tag(jet)))
            .count();
        if num_b_jets < cuts.min_b_tags {
            return Stage::IsoOk;
        }

        // Dilepton requirements
        let pair: [Lepton; 2] = match leptons.try_into() {
            Ok(pair) => pair,
            Err(_) => return Stage::BTagOk,
        };
        if !sampler.accept(eff.trigger(&pair)) {
            return Stage::ExactlyTwoLeptons;
        }
        let charge = match evcut::same_sign_charge(&pair) {
            Some(charge) => charge,
            None => return Stage::TriggerOk,
        };

        // Signal region requirements
        if !evcut::enough_jets(region, jets.len()) {
            return Stage::SameSign;
        }
        if !evcut::enough_b_jets(region, num_b_jets) {
            return Stage::JetsOk;
        }
        if !sampler.accept(eff.met(met, region.min_met)) {
            return Stage::BJetsOk;
        }
        if !sampler.accept(eff.ht(ht, region.min_ht)) {
            return Stage::MetOk;
        }
        if !evcut::charge_allowed(region, charge) {
            return Stage::HtOk;
        }

        // Made it this far? You pass
        Stage::Passed
    }
}

/// Run the selection over the events of a source
///
/// The loop goes through `plan.requested_events` generation attempts. Failed
/// attempts use up one of them, and the run stops early once the abort budget
/// is exhausted or the source runs dry. Either way, the efficiency is computed
/// with respect to the number of requested events.
///
pub fn run_cutflow<'regions, S: Sampler>(
    source: &mut impl EventSource,
    plan: &RunPlan,
    analysis: &mut Analysis<'regions, S>,
) -> Result<FinalResults<'regions>> {
    ensure!(plan.requested_events > 0, "Must simulate at least one event");
    ensure!(
        plan.variant.b_tagging() == BTagging::DetectorLevel || source.provides_hard_process(),
        "Parton-level b-tagging needs an event source which exposes the hard process"
    );
    tracing::info!(
        variant = %plan.variant,
        region = analysis.region.name,
        events = plan.requested_events,
        "Starting the event selection"
    );

    let b_tagging = plan.variant.b_tagging();
    let mut counters = CutflowCounters::new();
    let mut termination = Termination::Completed;
    let mut num_aborts = 0;
    for _ in 0..plan.requested_events {
        match source.next_event()? {
            Generated::Event(event) => {
                let stage = analysis.score_event(&event, b_tagging);
                tracing::trace!(?stage, "Event scored");
                counters.record(stage);
            }
            Generated::Aborted => {
                num_aborts += 1;
                if num_aborts < plan.abort_budget {
                    tracing::warn!("Event generation failed ({num_aborts} failures so far)");
                    continue;
                }
                tracing::warn!("Event generation aborted prematurely, owing to error!");
                termination = Termination::TooManyAborts;
                break;
            }
            Generated::Exhausted => {
                tracing::warn!("Event source ran out of events");
                termination = Termination::Exhausted;
                break;
            }
        }
    }

    Ok(FinalResults {
        counters,
        requested_events: plan.requested_events,
        num_aborts,
        termination,
        variant: plan.variant,
        region_index: analysis.region_index,
        region: analysis.region,
        object_cuts: analysis.object_cuts.clone(),
    })
}
