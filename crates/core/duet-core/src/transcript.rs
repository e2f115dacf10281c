//! Conversation turns and the append-only transcript

use serde::{Deserialize, Serialize};

/// Speaker name used for the first agent (and for the human side of the chat)
pub const AGENT_A: &str = "Agent A";

/// Speaker name used for the replying agent
pub const AGENT_B: &str = "Agent B";

/// Speaker name used for the arbiter in scripted debates
pub const DECIDER: &str = "Decider";

/// Speaker name used for session notices
pub const SYSTEM: &str = "System";

/// Speaker roles known to the color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// First agent, green
    AgentA,
    /// Second agent, blue
    AgentB,
    /// Arbiter, yellow
    Decider,
    /// Anything else (system notices, unknown speakers), gray
    Other,
}

impl Role {
    /// Classify a free-form speaker name; trimmed and case-insensitive
    pub fn from_speaker(speaker: &str) -> Self {
        let normalized = speaker.trim().to_lowercase();
        match normalized.as_str() {
            "agent a" => Role::AgentA,
            "agent b" => Role::AgentB,
            "decider" => Role::Decider,
            _ => Role::Other,
        }
    }

    /// Background color of a block spoken by this role
    pub fn color(&self) -> &'static str {
        match self {
            Role::AgentA => "#d1e7dd",
            Role::AgentB => "#cfe2ff",
            Role::Decider => "#fff3cd",
            Role::Other => "#f8f9fa",
        }
    }
}

/// Background color for a speaker name
pub fn speaker_color(speaker: &str) -> &'static str {
    Role::from_speaker(speaker).color()
}

/// A single utterance; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    speaker: String,
    content: String,
}

impl Turn {
    /// Create a turn
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
        }
    }

    /// Who said it
    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    /// What was said
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Palette role of the speaker
    pub fn role(&self) -> Role {
        Role::from_speaker(&self.speaker)
    }
}

/// Ordered, append-only list of turns; insertion order is display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in display order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been said yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterate turns in display order
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl FromIterator<Turn> for Transcript {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_is_case_insensitive_and_trimmed() {
        for name in ["Agent A", "agent a", " AGENT A ", "\tAgent a\n"] {
            assert_eq!(Role::from_speaker(name), Role::AgentA, "{name:?}");
        }
        assert_eq!(speaker_color(" agent b"), "#cfe2ff");
        assert_eq!(speaker_color("DECIDER"), "#fff3cd");
    }

    #[test]
    fn test_unknown_speakers_are_gray() {
        for name in ["System", "", "Agent C", "agenta", "Agent  A"] {
            assert_eq!(speaker_color(name), "#f8f9fa", "{name:?}");
        }
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.append(Turn::new(AGENT_A, "first"));
        transcript.append(Turn::new(AGENT_B, "second"));
        transcript.append(Turn::new(SYSTEM, "third"));

        let contents: Vec<&str> = transcript.iter().map(Turn::content).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns()[1].role(), Role::AgentB);
    }
}
