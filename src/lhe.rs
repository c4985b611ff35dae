//! Reader for Les Houches Event files
//!
//! Record decoding is left to the `lhef` crate. This module splits the input
//! into `<event>` blocks itself, so that one damaged block only costs one
//! event: it is reported as a generation failure and reading resumes at the
//! next block. See <https://arxiv.org/abs/hep-ph/0609017> for the format.

use crate::{
    event::{Event, Particle},
    evgen::{EventSource, Generated},
    momentum, Result,
};

use eyre::{ensure, format_err, WrapErr};
use lhef::HEPEUP;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str,
};

/// Particle status code of outgoing final-state particles
const FINAL_STATE: i32 = 1;

/// Closing tag of an LHE document
const DOCUMENT_END: &str = "</LesHouchesEvents>\n";

/// Sequential reader of the events of an LHE file
pub struct LheReader<R> {
    /// Source of LHE data
    input: R,

    /// Opening tag of the document and `<init>` block, which `lhef` needs to
    /// see in front of every event block
    prologue: String,

    /// Number of events which the header announces, if any
    declared_events: Option<usize>,

    /// Line buffer, reused across reads
    line: Vec<u8>,

    /// Truth that `line` holds the opening tag of the next event block
    at_block_start: bool,
}
//
impl LheReader<BufReader<File>> {
    /// Open an LHE file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open event sample {}", path.display()))?;
        Self::new(BufReader::new(file))
            .wrap_err_with(|| format!("Failed to read the header of {}", path.display()))
    }
}
//
impl<R: BufRead> LheReader<R> {
    /// Read LHE data from a buffered source
    ///
    /// Everything up to the first event block is read here: the run
    /// information is checked, and the announced number of events is looked
    /// up in the header.
    ///
    pub fn new(input: R) -> Result<Self> {
        let mut reader = Self {
            input,
            prologue: String::new(),
            declared_events: None,
            line: Vec::new(),
            at_block_start: false,
        };

        let mut seen_document = false;
        let mut seen_init = false;
        let mut in_init = false;
        while reader.read_line()? {
            let text = str::from_utf8(&reader.line).wrap_err("LHE header is not valid UTF-8")?;
            let trimmed = text.trim_start();
            if trimmed.starts_with("<event") {
                reader.at_block_start = true;
                break;
            }
            if trimmed.starts_with("<LesHouchesEvents") {
                seen_document = true;
                reader.prologue.push_str(text);
            } else if trimmed.starts_with("<init") {
                seen_init = true;
                in_init = true;
            }
            if in_init {
                reader.prologue.push_str(text);
                in_init = !trimmed.starts_with("</init");
            } else if reader.declared_events.is_none() {
                reader.declared_events = declared_event_count(trimmed);
            }
        }
        ensure!(
            seen_document && seen_init,
            "No <LesHouchesEvents> document with an <init> block, is this an LHE file?"
        );

        // Let lhef vet the run information once and for all
        let document = format!("{}{}", reader.prologue, DOCUMENT_END);
        lhef::Reader::new(document.as_bytes())
            .map_err(|err| format_err!("Invalid LHE run information: {err}"))?;
        Ok(reader)
    }

    /// Read one line into the internal buffer, returns false at end of input
    ///
    /// Only genuine I/O failures are errors, the bytes are not decoded yet.
    ///
    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        let num_bytes = self
            .input
            .read_until(b'\n', &mut self.line)
            .wrap_err("Failed to read the event sample")?;
        Ok(num_bytes > 0)
    }

    /// Decode one complete event block, tags included
    fn decode_block(&self, block: &[u8]) -> Result<Event> {
        let block = str::from_utf8(block).wrap_err("Event block is not valid UTF-8")?;

        // The particle count must fit in the block before lhef trusts it
        let mut lines = block.lines().skip(1);
        let num_particles = lines
            .next()
            .and_then(|line| line.split_whitespace().next())
            .and_then(|nup| nup.parse::<usize>().ok())
            .ok_or_else(|| format_err!("Event block has no particle count"))?;
        ensure!(
            num_particles <= lines.count(),
            "Event block announces {num_particles} particles but is shorter than that"
        );

        let document = format!("{}{}{}", self.prologue, block, DOCUMENT_END);
        let mut reader = lhef::Reader::new(document.as_bytes())
            .map_err(|err| format_err!("Invalid LHE run information: {err}"))?;
        let hepeup = reader
            .hepeup()
            .map_err(|err| format_err!("Invalid event record: {err}"))?
            .ok_or_else(|| format_err!("Event block holds no event record"))?;
        Ok(to_event(&hepeup))
    }
}
//
impl<R: BufRead> EventSource for LheReader<R> {
    fn next_event(&mut self) -> Result<Generated> {
        // Look for the next event block
        if !self.at_block_start {
            loop {
                if !self.read_line()? {
                    return Ok(Generated::Exhausted);
                }
                if is_tag_line(&self.line, b"<event") {
                    break;
                }
            }
        }
        self.at_block_start = false;

        // Collect it up to its closing tag. A block which is cut short by the
        // next opening tag or by the end of input is incomplete.
        let mut block = std::mem::take(&mut self.line);
        let mut complete = false;
        while self.read_line()? {
            if is_tag_line(&self.line, b"<event") {
                self.at_block_start = true;
                break;
            }
            block.extend_from_slice(&self.line);
            if is_tag_line(&self.line, b"</event") {
                complete = true;
                break;
            }
        }

        // Decode it, reporting damaged blocks as generation failures
        let decoded = if complete {
            self.decode_block(&block)
        } else {
            Err(format_err!("Event block is truncated"))
        };
        match decoded {
            Ok(event) => Ok(Generated::Event(event)),
            Err(err) => {
                tracing::warn!("Skipping malformed LHE event block: {err:#}");
                Ok(Generated::Aborted)
            }
        }
    }

    fn declared_events(&self) -> Option<usize> {
        self.declared_events
    }

    fn provides_hard_process(&self) -> bool {
        true
    }
}

/// Truth that a raw line starts with a given tag, leading whitespace aside
fn is_tag_line(line: &[u8], tag: &[u8]) -> bool {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    line[start..].starts_with(tag)
}

/// Convert an LHE event record into an event
///
/// An LHE record is the hard process, so it doubles as such.
///
fn to_event(hepeup: &HEPEUP) -> Event {
    let particles = hepeup
        .IDUP
        .iter()
        .zip(&hepeup.ISTUP)
        .zip(&hepeup.PUP)
        .filter(|((_, status), _)| **status == FINAL_STATE)
        .map(|((&pdg_id, _), p)| Particle::final_state(pdg_id, momentum::new(p[0], p[1], p[2], p[3])))
        .collect::<Vec<_>>();
    let hard_process = particles.clone();
    Event::new(particles).with_hard_process(hard_process)
}

/// Number of events announced by a header line
///
/// Event generators write it as a line of the form `10000 = nevents ! ...`.
///
fn declared_event_count(line: &str) -> Option<usize> {
    if !line.contains("nevents") {
        return None;
    }
    line.split_whitespace()
        .next()
        .and_then(|token| token.parse::<usize>().ok())
}
