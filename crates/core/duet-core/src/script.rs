//! Scripted demo conversation loaded from a JSON fixture
//!
//! The fixture has three top-level arrays, `start`, `argue` and `decision`,
//! each holding `{role, content}` records. Missing sections are empty.

use crate::transcript::Turn;
use crate::{DuetError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixture sections, in playback order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Opening statements
    Start,
    /// Back-and-forth between the agents
    Argue,
    /// The verdict
    Decision,
}

impl Section {
    /// Playback order
    pub const ORDER: [Section; 3] = [Section::Start, Section::Argue, Section::Decision];
}

/// One scripted utterance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ScriptRecord {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn to_turn(&self) -> Turn {
        Turn::new(self.role.clone(), self.content.clone())
    }
}

/// Read-only scripted conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    start: Vec<ScriptRecord>,
    #[serde(default)]
    argue: Vec<ScriptRecord>,
    #[serde(default)]
    decision: Vec<ScriptRecord>,
}

impl ReplayScript {
    /// Build a script from its three sections
    pub fn new(
        start: Vec<ScriptRecord>,
        argue: Vec<ScriptRecord>,
        decision: Vec<ScriptRecord>,
    ) -> Self {
        Self {
            start,
            argue,
            decision,
        }
    }

    /// Parse fixture JSON
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DuetError::fixture(format!("Malformed demo fixture: {}", e)))
    }

    /// Load a fixture from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DuetError::fixture(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&json)
    }

    /// Load a fixture from disk without blocking the runtime
    pub async fn load_async(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            DuetError::fixture(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&json)
    }

    /// Records of one section, in file order
    pub fn section(&self, section: Section) -> &[ScriptRecord] {
        match section {
            Section::Start => &self.start,
            Section::Argue => &self.argue,
            Section::Decision => &self.decision,
        }
    }

    /// Every record in playback order
    pub fn records(&self) -> impl Iterator<Item = &ScriptRecord> + '_ {
        Section::ORDER
            .into_iter()
            .flat_map(move |section| self.section(section).iter())
    }

    /// Total record count across sections
    pub fn len(&self) -> usize {
        self.start.len() + self.argue.len() + self.decision.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every record as a turn, in playback order
    pub fn to_turns(&self) -> Vec<Turn> {
        self.records().map(ScriptRecord::to_turn).collect()
    }
}
