use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, SecondsFormat};
use log::info;

use crate::error::AuditError;
use crate::orifice::FlowParameters;
use crate::search::{SearchRequest, SearchResult};

/// Summary of one search, as written to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    pub timestamp: DateTime<Local>,
    pub parameters: FlowParameters,
    pub desired_flow: f64,
    pub tolerance: f64,
    pub optimal_beta: Option<f64>,
}

impl SearchRecord {
    pub fn new(request: &SearchRequest, result: &SearchResult) -> Self {
        Self {
            timestamp: Local::now(),
            parameters: request.parameters,
            desired_flow: request.desired_flow,
            tolerance: request.tolerance,
            optimal_beta: result.optimal_beta,
        }
    }
}

impl fmt::Display for SearchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.parameters;
        write!(
            f,
            "[beta search] D={}, C={}, dP={}, rho={}, Q={}, tolerance={}, beta_opt=",
            p.pipe_diameter,
            p.discharge_coefficient,
            p.pressure_differential,
            p.fluid_density,
            self.desired_flow,
            self.tolerance,
        )?;
        match self.optimal_beta {
            Some(beta) => write!(f, "{beta}"),
            None => write!(f, "None"),
        }
    }
}

/// Destination for search records. Implementations must tolerate concurrent callers.
pub trait SearchSink {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError>;
}

/// Forwards records to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SearchSink for LogSink {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        info!("{record}");
        Ok(())
    }
}

/// Appends one timestamped line per record to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SearchSink for FileSink {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        let mut file = self.file.lock().map_err(|_| AuditError::Poisoned)?;
        writeln!(
            file,
            "{} {}",
            record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            record
        )?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps records in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SearchRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<SearchRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SearchSink for MemorySink {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        self.records
            .lock()
            .map_err(|_| AuditError::Poisoned)?
            .push(record.clone());
        Ok(())
    }
}

impl<S: SearchSink + ?Sized> SearchSink for &S {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        (**self).record(record)
    }
}

impl<S: SearchSink + ?Sized> SearchSink for Box<S> {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        (**self).record(record)
    }
}

impl<S: SearchSink> SearchSink for Option<S> {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        match self {
            Some(sink) => sink.record(record),
            None => Ok(()),
        }
    }
}

/// Records to both sinks; the first failure is returned after both have been tried.
impl<A: SearchSink, B: SearchSink> SearchSink for (A, B) {
    fn record(&self, record: &SearchRecord) -> Result<(), AuditError> {
        let first = self.0.record(record);
        let second = self.1.record(record);
        first.and(second)
    }
}
