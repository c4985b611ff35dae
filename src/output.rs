//! This module is in charge of outputting the final selection results to the
//! standard output and to the cutflow report file

use crate::{
    numeric::Float,
    resfin::FinalResults,
    Result,
};

use eyre::WrapErr;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    time::Duration,
};

/// Output the selection results to the console and to disk
pub fn dump_results(
    res_fin: &FinalResults,
    output_path: impl AsRef<Path>,
    elapsed_time: Duration,
) -> Result<()> {
    let output_path = output_path.as_ref();

    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .wrap_err("Failed to format the current time")?;

    // Print out the cutflow on stdout
    res_fin.print(&timestamp);
    let elapsed_secs = elapsed_time.as_secs_f64();
    println!(
        "Selection took {:.3} s ({:.3e} s per requested event)",
        elapsed_secs,
        elapsed_secs / res_fin.requested_events as Float
    );

    // Write the cutflow report
    let file = File::create(output_path)
        .wrap_err_with(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_report(&mut writer, res_fin)
        .and_then(|()| writer.flush())
        .wrap_err_with(|| format!("Failed to write {}", output_path.display()))?;
    tracing::info!("Cutflow report written to {}", output_path.display());

    // ...and we're done
    Ok(())
}

/// Write the tab-delimited cutflow report
///
/// One `label<TAB>count` line per stage, in stage order, then the efficiency.
///
fn write_report(writer: &mut impl Write, res_fin: &FinalResults) -> io::Result<()> {
    for (label, count) in res_fin.rows() {
        writeln!(writer, "{}\t{}", label, count)?;
    }
    writeln!(writer, "efficiency\t{}", res_fin.efficiency())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cutflow::{CutflowCounters, Stage},
        evcut::ObjectCuts,
        pipeline::PipelineVariant,
        region::SignalRegionTable,
        resfin::Termination,
    };
    use std::fs;

    #[test]
    fn report_is_written_to_disk() {
        let table = SignalRegionTable::same_sign_dilepton().unwrap();
        let mut counters = CutflowCounters::new();
        counters.record(Stage::Passed);
        counters.record(Stage::Generated);
        let results = FinalResults {
            counters,
            requested_events: 4,
            num_aborts: 0,
            termination: Termination::Completed,
            variant: PipelineVariant::Signal,
            region_index: 8,
            region: table.get(8).unwrap(),
            object_cuts: ObjectCuts::default(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cutflow.dat");
        dump_results(&results, &path, Duration::from_millis(10)).unwrap();

        let report = fs::read_to_string(&path).unwrap();
        let lines = report.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), Stage::ALL.len() + 1);
        assert_eq!(lines[0], "Generated events\t2");
        assert_eq!(lines[1], "at least 2 leptons with pT >= 20 GeV, |eta| < 2.4\t1");
        assert_eq!(lines[Stage::ALL.len() - 1], "passed all cuts\t1");
        assert_eq!(lines[Stage::ALL.len()], "efficiency\t0.25");

        // Unwritable destinations are reported
        let bad_path = dir.path().join("no/such/dir/cutflow.dat");
        assert!(dump_results(&results, bad_path, Duration::ZERO).is_err());
    }

    #[test]
    fn efficiency_keeps_full_precision() {
        let table = SignalRegionTable::same_sign_dilepton().unwrap();
        let mut counters = CutflowCounters::new();
        counters.record(Stage::Passed);
        let results = FinalResults {
            counters,
            requested_events: 3,
            num_aborts: 0,
            termination: Termination::Completed,
            variant: PipelineVariant::Background,
            region_index: 0,
            region: table.get(0).unwrap(),
            object_cuts: ObjectCuts::default(),
        };
        let mut report = Vec::new();
        write_report(&mut report, &results).unwrap();
        let report = String::from_utf8(report).unwrap();
        assert_eq!(report.lines().last(), Some("efficiency\t0.3333333333333333"));
    }
}
