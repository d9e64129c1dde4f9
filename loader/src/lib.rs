use common::job::Job;

use std::fmt;
use std::io::BufRead;
use std::ops::Range;

use log::{debug, info, warn};
use thiserror::Error;

pub const JOB_CARD: &str = "$AMJ";
pub const DATA_CARD: &str = "$DTA";
pub const END_CARD: &str = "$END";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Pid,
    Ttl,
    Tll,
}

impl HeaderField {
    pub const WIDTH: usize = 4;

    // Byte columns of the field on the $AMJ card.
    pub fn columns(self) -> Range<usize> {
        let start = JOB_CARD.len() + Self::WIDTH * (self as usize);
        start..start + Self::WIDTH
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderField::Pid => "process id",
            HeaderField::Ttl => "time limit",
            HeaderField::Tll => "line limit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Line {line}: invalid {field} {text:?} on job card")]
    BadHeader {
        line: usize,
        field: HeaderField,
        text: String,
    },

    #[error("Failed to read job deck: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Program,
    Data,
}

#[derive(Default)]
struct DeckLoader {
    jobs: Vec<Job>,
    open: Option<(Job, Section)>,
}

impl DeckLoader {
    fn feed(&mut self, lineno: usize, line: &str) -> Result<(), LoadError> {
        if line.starts_with(JOB_CARD) {
            if let Some((job, _)) = self.open.take() {
                warn!("Line {lineno}: job {} has no {END_CARD} card, dropping it", job.pid);
            }
            let job = Job::new(
                header_field(lineno, line, HeaderField::Pid)?,
                header_field(lineno, line, HeaderField::Ttl)?,
                header_field(lineno, line, HeaderField::Tll)?,
            );
            debug!("Line {lineno}: job {} (TTL {}, TLL {})", job.pid, job.ttl, job.tll);
            self.open = Some((job, Section::Program));
        } else if line.starts_with(DATA_CARD) {
            match &mut self.open {
                Some((_, section)) => *section = Section::Data,
                None => warn!("Line {lineno}: {DATA_CARD} card outside a job"),
            }
        } else if line.starts_with(END_CARD) {
            match self.open.take() {
                Some((job, _)) => {
                    info!(
                        "Loaded job {}: {} program cards, {} data cards",
                        job.pid,
                        job.program.len(),
                        job.data.len()
                    );
                    self.jobs.push(job);
                }
                None => warn!("Line {lineno}: {END_CARD} card outside a job"),
            }
        } else {
            match &mut self.open {
                Some((job, Section::Data)) => job.data.push_back(line.to_string()),
                Some((job, Section::Program)) => {
                    let card: String = line.chars().filter(|c| !c.is_whitespace()).collect();
                    if !card.is_empty() {
                        job.program.push(card);
                    }
                }
                None => warn!("Line {lineno}: card outside a job: {line:?}"),
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Job> {
        if let Some((job, _)) = self.open.take() {
            warn!("Deck ended inside job {}, dropping it", job.pid);
        }
        self.jobs
    }
}

fn header_field(lineno: usize, line: &str, field: HeaderField) -> Result<u32, LoadError> {
    let cols = field.columns();
    let text = line
        .get(cols.start.min(line.len())..cols.end.min(line.len()))
        .unwrap_or("");
    text.trim().parse().map_err(|_| LoadError::BadHeader {
        line: lineno,
        field,
        text: text.to_string(),
    })
}

pub fn parse_deck(input: &str) -> Result<Vec<Job>, LoadError> {
    let mut loader = DeckLoader::default();
    for (idx, line) in input.lines().enumerate() {
        loader.feed(idx + 1, line)?;
    }
    Ok(loader.finish())
}

pub fn read_deck(reader: impl BufRead) -> Result<Vec<Job>, LoadError> {
    let mut loader = DeckLoader::default();
    for (idx, line) in reader.lines().enumerate() {
        loader.feed(idx + 1, &line?)?;
    }
    Ok(loader.finish())
}
