//! Chat session: transcript state, trigger policy and mock agent replies

use crate::config::SessionSettings;
use crate::render::TranscriptRenderer;
use crate::replay::{replay_stream, ReplayAbort, SnapshotStream};
use crate::script::ReplayScript;
use crate::transcript::{Transcript, Turn, AGENT_A, AGENT_B, SYSTEM};
use crate::upload::{DataSummary, UploadKind};
use crate::Result;
use tracing::{debug, info};

/// Greeting appended when a session starts
pub const GREETING: &str = "System initialized; both agents are ready.";

/// Shown in place of the demo conversation when the fixture cannot be loaded
pub const NO_DEMO_DATA: &str = "No demo data available";

/// Canned reply of the second agent
pub fn agent_reply(message: &str) -> String {
    format!("Agent B reply: I received your message - '{}'", message)
}

/// One conversation between the two mock agents
pub struct ChatSession {
    settings: SessionSettings,
    transcript: Transcript,
    renderer: TranscriptRenderer,
    abort: ReplayAbort,
}

impl ChatSession {
    /// Start a session holding only the greeting
    pub fn new(settings: SessionSettings) -> Self {
        let mut transcript = Transcript::new();
        transcript.append(Turn::new(SYSTEM, GREETING));
        Self {
            settings,
            transcript,
            renderer: TranscriptRenderer::new(),
            abort: ReplayAbort::new(),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn renderer(&self) -> &TranscriptRenderer {
        &self.renderer
    }

    /// Add a turn to the transcript
    pub fn append(&mut self, turn: Turn) {
        self.transcript.append(turn);
    }

    /// Render the current transcript
    pub fn render(&self) -> Result<String> {
        self.renderer.render(self.transcript.turns())
    }

    /// Whether `text` asks for the scripted demo
    pub fn is_trigger(&self, text: &str) -> bool {
        text.contains(self.settings.trigger_phrase.as_str())
    }

    /// Handle a free-text message
    ///
    /// Empty input returns the current render untouched. A message carrying
    /// the trigger phrase returns the full demo conversation and leaves the
    /// transcript alone. Anything else is echoed by the second agent.
    pub fn send_message(&mut self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return self.render();
        }
        if self.is_trigger(text) {
            info!("CHAT_TRIGGER demo playback requested");
            return self.demo_render();
        }

        self.append(Turn::new(AGENT_A, text));
        self.append(Turn::new(AGENT_B, agent_reply(text)));
        debug!("CHAT_MESSAGE turns={}", self.transcript.len());
        self.render()
    }

    /// Announce a stored upload and let the second agent acknowledge it
    pub fn record_upload(
        &mut self,
        kind: UploadKind,
        stored_name: &str,
        summary: Option<DataSummary>,
    ) -> Result<String> {
        self.append(Turn::new(
            AGENT_A,
            format!("Uploaded {}: {}", kind.label(), stored_name),
        ));
        let detail = match summary {
            Some(summary) => summary.to_string(),
            None => stored_name.to_string(),
        };
        self.append(Turn::new(
            AGENT_B,
            agent_reply(&format!("Received {}: {}", kind.label(), detail)),
        ));
        self.render()
    }

    /// Read the demo fixture afresh
    pub fn load_script(&self) -> Result<ReplayScript> {
        ReplayScript::load(&self.settings.fixture_path)
    }

    /// The whole demo conversation, untimed
    pub fn demo_render(&self) -> Result<String> {
        let script = self.load_script()?;
        self.demo_render_script(&script)
    }

    /// The whole demo conversation from an already loaded script
    pub fn demo_render_script(&self, script: &ReplayScript) -> Result<String> {
        self.renderer.render(&script.to_turns())
    }

    /// Timed playback of the demo conversation
    pub fn replay(&self) -> Result<SnapshotStream> {
        let script = self.load_script()?;
        Ok(self.replay_script(&script))
    }

    /// Timed playback of an already loaded script
    pub fn replay_script(&self, script: &ReplayScript) -> SnapshotStream {
        replay_stream(
            script,
            self.renderer.clone(),
            self.settings.replay_interval,
            self.abort.subscribe(),
        )
    }

    /// Notice fragment used when the demo cannot be shown
    pub fn render_no_demo(&self) -> Result<String> {
        self.renderer.render_notice(NO_DEMO_DATA)
    }

    /// Handle that stops this session's replays
    pub fn abort_handle(&self) -> ReplayAbort {
        self.abort.clone()
    }

    /// End the session: in-flight replays stop before their next snapshot
    pub fn end(&self) {
        info!("SESSION_END aborting replays");
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::count_turn_blocks;
    use futures_util::StreamExt;
    use std::io::Write;
    use std::time::Duration;

    const DEFAULT_TRIGGER: &str = crate::config::DEFAULT_TRIGGER_PHRASE;

    const FIXTURE: &str = r#"{
        "start": [{"role": "Agent A", "content": "opening"}, {"role": "Agent B", "content": "counter"}],
        "argue": [{"role": "agent a", "content": "a1"}, {"role": "AGENT B", "content": "b1"}, {"role": "Agent A", "content": "a2"}],
        "decision": [{"role": "Decider", "content": "verdict"}]
    }"#;

    fn fixture() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        file
    }

    fn session(path: &std::path::Path) -> ChatSession {
        ChatSession::new(
            SessionSettings::default()
                .with_fixture_path(path)
                .with_replay_interval(Duration::from_millis(10)),
        )
    }

    #[test]
    fn test_new_session_has_greeting() {
        let session = ChatSession::new(SessionSettings::default());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().turns()[0], Turn::new(SYSTEM, GREETING));
    }

    #[test]
    fn test_message_appends_turn_and_reply() {
        let file = fixture();
        let mut session = session(file.path());

        let html = session.send_message("hello").unwrap();

        assert_eq!(session.transcript().len(), 3);
        assert_eq!(session.transcript().turns()[1], Turn::new(AGENT_A, "hello"));
        assert_eq!(
            session.transcript().turns()[2].content(),
            "Agent B reply: I received your message - 'hello'"
        );
        assert_eq!(count_turn_blocks(&html), 3);
        assert_eq!(html, session.render().unwrap());
    }

    #[test]
    fn test_empty_message_is_noop() {
        let file = fixture();
        let mut session = session(file.path());
        session.send_message("hi").unwrap();
        let before = session.render().unwrap();

        for empty in ["", "   ", "\n"] {
            let html = session.send_message(empty).unwrap();
            assert_eq!(session.transcript().len(), 3);
            assert_eq!(html, before);
        }
    }

    #[test]
    fn test_trigger_returns_full_demo_render() {
        let file = fixture();
        let mut session = session(file.path());
        let expected = session.demo_render().unwrap();

        let message = format!("{}, thanks", DEFAULT_TRIGGER);
        let html = session.send_message(&message).unwrap();

        assert_eq!(html, expected);
        assert_eq!(count_turn_blocks(&html), 6);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_agent_reply_template() {
        assert_eq!(
            agent_reply("hello"),
            "Agent B reply: I received your message - 'hello'"
        );
    }

    #[tokio::test]
    async fn test_demo_render_script_matches_demo_render() {
        let file = fixture();
        let session = session(file.path());
        let script = ReplayScript::load_async(file.path()).await.unwrap();

        let html = session.demo_render_script(&script).unwrap();

        assert_eq!(html, session.demo_render().unwrap());
        assert_eq!(count_turn_blocks(&html), 6);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_trigger_without_fixture_is_fixture_error() {
        let mut session = session(std::path::Path::new("/nonexistent/chat.json"));
        let err = session.send_message(DEFAULT_TRIGGER).unwrap_err();
        assert!(err.is_fixture());
        assert!(session
            .render_no_demo()
            .unwrap()
            .contains("No demo data available"));
    }

    #[test]
    fn test_record_upload_with_summary() {
        let file = fixture();
        let mut session = session(file.path());

        session
            .record_upload(
                UploadKind::Eeg,
                "eeg_20250101_000000.csv",
                Some(DataSummary::Shape { rows: 4, columns: 2 }),
            )
            .unwrap();

        let turns = session.transcript().turns();
        assert_eq!(turns[1].content(), "Uploaded EEG data: eeg_20250101_000000.csv");
        assert_eq!(
            turns[2].content(),
            "Agent B reply: I received your message - 'Received EEG data: Data shape: 4 rows x 2 columns'"
        );
    }

    #[test]
    fn test_record_video_upload_names_file() {
        let file = fixture();
        let mut session = session(file.path());
        session
            .record_upload(UploadKind::Video, "video_20250101_000000.mp4", None)
            .unwrap();
        assert!(session.transcript().turns()[2]
            .content()
            .ends_with("'Received video: video_20250101_000000.mp4'"));
    }

    #[tokio::test]
    async fn test_replay_ends_with_full_render() {
        let file = fixture();
        let session = session(file.path());

        let snapshots: Vec<String> = session
            .replay()
            .unwrap()
            .map(|s| s.unwrap())
            .collect()
            .await;

        assert_eq!(snapshots.len(), 6);
        assert_eq!(snapshots.last().unwrap(), &session.demo_render().unwrap());
    }

    #[tokio::test]
    async fn test_end_stops_replay() {
        let file = fixture();
        let session = session(file.path());
        let mut stream = session.replay().unwrap();

        stream.next().await.unwrap().unwrap();
        session.end();
        assert!(stream.next().await.is_none());
    }
}
