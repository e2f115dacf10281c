//! Duet core
//!
//! State and rendering for a two-agent demo conversation:
//!
//! - Append-only transcript of speaker turns
//! - HTML rendering with a per-role color palette
//! - Scripted playback of a fixture conversation, revealed one record at a time
//! - Mock upload handling for video, fNIRS and EEG recordings
//!
//! # Example
//!
//! ```no_run
//! use duet_core::{ChatSession, SessionSettings};
//!
//! fn main() -> duet_core::Result<()> {
//!     let mut session = ChatSession::new(SessionSettings::from_env());
//!     let html = session.send_message("hello")?;
//!     println!("{}", html);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod render;
pub mod replay;
pub mod script;
pub mod session;
pub mod transcript;
pub mod upload;
pub mod utils;

pub use config::{
    get_env_bool, get_env_int, get_env_or, load_env, SessionSettings,
    DEFAULT_FIXTURE_PATH, DEFAULT_REPLAY_INTERVAL_MS, DEFAULT_TRIGGER_PHRASE,
};
pub use error::{DuetError, Result};
pub use render::{count_turn_blocks, TranscriptRenderer, CHAT_PANEL_SELECTOR};
pub use replay::{replay_stream, Replay, ReplayAbort, ReplayState, SnapshotStream};
pub use script::{ReplayScript, ScriptRecord, Section};
pub use session::{agent_reply, ChatSession, GREETING, NO_DEMO_DATA};
pub use transcript::{speaker_color, Role, Transcript, Turn, AGENT_A, AGENT_B, DECIDER, SYSTEM};
pub use upload::{
    sanitize_filename, stored_file_name, summarize_tabular, DataSummary, StoredUpload,
    UploadKind, UploadStore,
};
pub use utils::init_logging;
