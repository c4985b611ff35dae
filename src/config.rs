//! Mechanism for loading and sharing the run configuration

use crate::{pipeline::PipelineVariant, region::DEFAULT_REGION_INDEX, Result};

use eyre::{bail, ensure, format_err, Error, WrapErr};

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Default location of the event sample
const DEFAULT_SAMPLE: &str = "events.lhe";

/// Default location of the run configuration
const DEFAULT_RUN_CONFIG: &str = "run.cmnd";

/// Default location of the cutflow report
const DEFAULT_OUTPUT: &str = "cutflow.dat";

/// Number of failed event generations that a run tolerates by default
const DEFAULT_ABORT_BUDGET: usize = 10;

/// Positional command-line arguments
#[derive(Clone, Debug, PartialEq)]
pub struct Arguments {
    /// Event sample to be analyzed
    pub sample_path: PathBuf,

    /// Run configuration file
    pub run_config_path: PathBuf,

    /// Index of the signal region in the signal region table
    pub region_index: usize,

    /// Destination of the cutflow report
    pub output_path: PathBuf,
}
//
impl Arguments {
    /// Decode the program arguments (without the program name)
    ///
    /// Usage: `[sample] [run configuration] [signal region] [output]`, every
    /// argument which is left out takes its default value.
    ///
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let sample_path = args.next().unwrap_or_else(|| DEFAULT_SAMPLE.to_owned());
        let run_config_path = args.next().unwrap_or_else(|| DEFAULT_RUN_CONFIG.to_owned());
        let region_index = match args.next() {
            Some(index) => ConfigItem::new("signal region index", &index).parse::<usize>()?,
            None => DEFAULT_REGION_INDEX,
        };
        let output_path = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_owned());
        if let Some(extra) = args.next() {
            bail!("Unexpected command-line argument: {}", extra);
        }
        Ok(Self {
            sample_path: sample_path.into(),
            run_config_path: run_config_path.into(),
            region_index,
            output_path: output_path.into(),
        })
    }
}

/// Run configuration
///
/// Read from a Pythia-style command file, made of `Key = value` lines. Keys
/// are case-insensitive and settings which are not ours are left to the
/// event generator.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Number of events to be generated (Main:numberOfEvents)
    pub num_events: Option<usize>,

    /// Number of generation failures tolerated (Main:timesAllowErrors)
    pub abort_budget: usize,

    /// Fixed random seed (Random:setSeed + Random:seed), if any
    pub seed: Option<u64>,

    /// Flavor of selection pipeline to be run (Cutflow:variant)
    pub variant: PipelineVariant,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: impl AsRef<Path>) -> Result<Self> {
        let file_name = file_name.as_ref();
        let config_str = fs::read_to_string(file_name)
            .wrap_err_with(|| format!("Failed to read {}", file_name.display()))?;
        let config = Self::parse(&config_str)?;
        config.print();
        Ok(config)
    }

    /// Decode and check the contents of a command file
    pub fn parse(config_str: &str) -> Result<Self> {
        // Collect the settings, stripping comments and normalizing key case.
        // Later occurences of a key override earlier ones.
        let mut settings = HashMap::new();
        for line in config_str.lines() {
            let line = line.split(['!', '#']).next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) => {
                    settings.insert(key.trim().to_lowercase(), value.trim());
                }
                None => tracing::debug!("Ignoring command file line without a value: {line}"),
            }
        }
        let item = |name: &'static str| {
            settings
                .get(&name.to_lowercase())
                .map(|data| ConfigItem::new(name, data))
        };

        // Decode the settings that we care about
        let num_events = item("Main:numberOfEvents")
            .map(|item| item.parse::<usize>())
            .transpose()?;
        let abort_budget = item("Main:timesAllowErrors")
            .map(|item| item.parse::<usize>())
            .transpose()?
            .unwrap_or(DEFAULT_ABORT_BUDGET);
        let set_seed = item("Random:setSeed")
            .map(ConfigItem::parse_bool)
            .transpose()?
            .unwrap_or(false);
        let seed = item("Random:seed")
            .map(|item| item.parse::<i64>())
            .transpose()?;
        let variant = item("Cutflow:variant")
            .map(|item| item.parse::<PipelineVariant>())
            .transpose()?
            .unwrap_or(PipelineVariant::Background);
        let config = Configuration {
            num_events,
            abort_budget,
            // Like in Pythia, a non-positive seed means "seed from the clock"
            seed: seed.filter(|&seed| set_seed && seed > 0).map(|seed| seed as u64),
            variant,
        };

        // A sensible run must be asked for at least one event
        ensure!(
            config.num_events != Some(0),
            "Please simulate at least one event"
        );

        // If nothing bad occured, we can now return the configuration
        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        let or_unset = |value: Option<String>| value.unwrap_or_else(|| "(unset)".to_owned());
        println!(
            "Main:numberOfEvents    : {}",
            or_unset(self.num_events.map(|n| n.to_string()))
        );
        println!("Main:timesAllowErrors  : {}", self.abort_budget);
        println!(
            "Random:seed            : {}",
            or_unset(self.seed.map(|seed| seed.to_string()))
        );
        println!("Cutflow:variant        : {}", self.variant);
    }
}

/// A value from the configuration, tagged with the setting which it is
/// supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a setting name and raw data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: Into<Error>,
    {
        self.data
            .parse::<T>()
            .map_err(Into::<Error>::into)
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse this data using Pythia's lenient boolean syntax
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => Ok(true),
            "off" | "no" | "false" | "0" => Ok(false),
            _ => Err(format_err!(
                "Could not parse configuration of {}: {:?} is not a boolean",
                self.name,
                self.data
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Result<Arguments> {
        Arguments::parse(list.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn arguments_have_defaults() {
        let defaults = args(&[]).unwrap();
        assert_eq!(defaults.sample_path, PathBuf::from(DEFAULT_SAMPLE));
        assert_eq!(defaults.run_config_path, PathBuf::from(DEFAULT_RUN_CONFIG));
        assert_eq!(defaults.region_index, DEFAULT_REGION_INDEX);
        assert_eq!(defaults.output_path, PathBuf::from(DEFAULT_OUTPUT));

        let custom = args(&["ttW.lhe", "bg.cmnd", "3", "out.dat"]).unwrap();
        assert_eq!(custom.sample_path, PathBuf::from("ttW.lhe"));
        assert_eq!(custom.region_index, 3);
        assert_eq!(custom.output_path, PathBuf::from("out.dat"));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        let err = args(&["a.lhe", "b.cmnd", "eight"]).unwrap_err();
        assert!(format!("{err:#}").contains("signal region index"));
        assert!(args(&["a", "b", "1", "c", "d"]).is_err());
    }

    #[test]
    fn command_file_settings() {
        let config = Configuration::parse(
            "! Generator settings are none of our business\n\
             Beams:eCM = 8000.\n\
             main:NUMBEROFEVENTS = 5000   ! number of events\n\
             Main:timesAllowErrors = 3\n\
             Random:setSeed = on\n\
             Random:seed = 1234\n\
             Cutflow:variant = signal-btag\n\
             a line without any value\n",
        )
        .unwrap();
        assert_eq!(config.num_events, Some(5000));
        assert_eq!(config.abort_budget, 3);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.variant, PipelineVariant::PartonBTagSignal);
    }

    #[test]
    fn command_file_defaults() {
        let config = Configuration::parse("Random:seed = 1234\n").unwrap();
        assert_eq!(config.num_events, None);
        assert_eq!(config.abort_budget, DEFAULT_ABORT_BUDGET);
        assert_eq!(config.seed, None);
        assert_eq!(config.variant, PipelineVariant::Background);

        let clock = Configuration::parse("Random:setSeed = on\nRandom:seed = 0\n").unwrap();
        assert_eq!(clock.seed, None);
    }

    #[test]
    fn bad_settings_are_reported() {
        let err = Configuration::parse("Main:numberOfEvents = many\n").unwrap_err();
        assert!(format!("{err:#}").contains("Main:numberOfEvents"));
        assert!(Configuration::parse("Main:numberOfEvents = 0\n").is_err());
        assert!(Configuration::parse("Random:setSeed = maybe\n").is_err());
        assert!(Configuration::parse("Cutflow:variant = sideband\n").is_err());
    }

    #[test]
    fn configuration_files_are_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Main:numberOfEvents = 10").unwrap();
        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.num_events, Some(10));
        assert!(Configuration::load("/no/such/run.cmnd").is_err());
    }
}
