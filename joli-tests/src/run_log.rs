// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedRun {
    pub job: usize,

    /// Position among all started runs, 0 for the first
    pub start_seq: usize,

    /// Milliseconds since the timeline origin
    pub started_ms: u64,

    pub finished_ms: Option<u64>,

    pub failed: bool,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RunLog {
    pub runs: Vec<LoggedRun>,
}

impl RunLog {
    pub fn get(&self, job: usize) -> Option<&LoggedRun> {
        self.runs.iter().find(|run| run.job == job)
    }

    /// Job ids in the order their `run` was entered.
    pub fn start_order(&self) -> Vec<usize> {
        let mut runs: Vec<&LoggedRun> = self.runs.iter().collect();
        runs.sort_by_key(|run| run.start_seq);
        runs.iter().map(|run| run.job).collect()
    }

    /// Pretty JSON, meant for assertion messages.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}
