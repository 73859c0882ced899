//! Append-only record of decisions
//!
//! Every decision is kept in memory and, when a path is given, mirrored to a
//! JSON-lines file. A failed write is logged and does not affect the
//! decision itself.

use crate::request::{DecisionRequest, ExternalAction};
use cfrbot_engine::{Action, Strategy};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One logged decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub player: String,
    pub request: DecisionRequest,
    /// Root average strategy as `(action, probability)` pairs
    pub strategy: Vec<(Action, f64)>,
    pub chosen: ExternalAction,
    pub iterations: u32,
}

impl DecisionRecord {
    pub fn new(player: &str, request: &DecisionRequest, strategy: &Strategy, chosen: ExternalAction, iterations: u32) -> Self {
        DecisionRecord {
            player: player.to_string(),
            request: request.clone(),
            strategy: strategy.iter().collect(),
            chosen,
            iterations,
        }
    }
}

/// Append-only decision log
#[derive(Debug, Default)]
pub struct DecisionLog {
    records: Vec<DecisionRecord>,
    sink: Option<BufWriter<File>>,
}

impl DecisionLog {
    /// In-memory log
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that also appends each record as one JSON line to `path`
    pub fn with_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(DecisionLog {
            records: Vec::new(),
            sink: Some(BufWriter::new(file)),
        })
    }

    pub fn append(&mut self, record: DecisionRecord) {
        if let Some(sink) = self.sink.as_mut() {
            let written = serde_json::to_writer(&mut *sink, &record)
                .map_err(io::Error::from)
                .and_then(|_| sink.write_all(b"\n"))
                .and_then(|_| sink.flush());
            if let Err(e) = written {
                warn!("decision log write failed: {}", e);
            }
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
