//! Timed, incremental playback of a scripted conversation
//!
//! A replay walks `Idle -> Revealing(1) -> ... -> Revealing(N) -> Done`. Each
//! step into `Revealing(k)` produces a render of the first `k` records; the
//! stream form waits a fixed interval between two steps.

use crate::render::TranscriptRenderer;
use crate::script::ReplayScript;
use crate::transcript::Turn;
use crate::Result;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Lazily produced replay snapshots
pub type SnapshotStream = BoxStream<'static, Result<String>>;

/// Progress of a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    /// Nothing revealed yet
    Idle,
    /// This many records are visible
    Revealing(usize),
    /// Every record was revealed
    Done,
}

/// Step-wise replay over a script, without timing
#[derive(Debug, Clone)]
pub struct Replay {
    turns: Vec<Turn>,
    state: ReplayState,
}

impl Replay {
    /// Start an idle replay of `script`
    pub fn new(script: &ReplayScript) -> Self {
        Self {
            turns: script.to_turns(),
            state: ReplayState::Idle,
        }
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Number of snapshots the replay produces
    pub fn total(&self) -> usize {
        self.turns.len()
    }

    /// Whether another `advance` would end the replay
    pub fn is_exhausted(&self) -> bool {
        match self.state {
            ReplayState::Idle => self.turns.is_empty(),
            ReplayState::Revealing(k) => k >= self.turns.len(),
            ReplayState::Done => true,
        }
    }

    /// Records visible in the current state
    pub fn revealed(&self) -> &[Turn] {
        match self.state {
            ReplayState::Idle => &[],
            ReplayState::Revealing(k) => &self.turns[..k],
            ReplayState::Done => &self.turns,
        }
    }

    /// Reveal one more record; `None` once the replay is done
    pub fn advance(&mut self) -> Option<&[Turn]> {
        let total = self.turns.len();
        self.state = match self.state {
            ReplayState::Idle if total > 0 => ReplayState::Revealing(1),
            ReplayState::Revealing(k) if k < total => ReplayState::Revealing(k + 1),
            _ => ReplayState::Done,
        };
        match self.state {
            ReplayState::Revealing(k) => Some(&self.turns[..k]),
            _ => None,
        }
    }
}

/// Stops in-flight replays, e.g. when the session ends
#[derive(Clone)]
pub struct ReplayAbort {
    tx: Arc<watch::Sender<bool>>,
}

impl ReplayAbort {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// End every replay subscribed to this handle
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Receiver handed to a replay stream
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ReplayAbort {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once the abort flag is raised; never resolves if the handle is gone
async fn aborted(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Cumulative snapshots of `script`, one per record, `interval` apart
///
/// The first snapshot is available immediately. The stream ends right after
/// the last snapshot with no trailing wait, and earlier when `abort` fires or
/// the consumer drops it.
pub fn replay_stream(
    script: &ReplayScript,
    renderer: TranscriptRenderer,
    interval: Duration,
    abort: watch::Receiver<bool>,
) -> SnapshotStream {
    let replay = Replay::new(script);
    debug!("REPLAY_START records={}", replay.total());
    stream::unfold(
        (replay, renderer, abort),
        move |(mut replay, renderer, mut abort)| async move {
            if *abort.borrow() {
                debug!("REPLAY_ABORTED state={:?}", replay.state());
                return None;
            }
            if replay.is_exhausted() {
                debug!("REPLAY_DONE records={}", replay.total());
                return None;
            }
            if replay.state() != ReplayState::Idle {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = aborted(&mut abort) => {
                        debug!("REPLAY_ABORTED state={:?}", replay.state());
                        return None;
                    }
                }
            }
            let snapshot = renderer.render(replay.advance()?);
            Some((snapshot, (replay, renderer, abort)))
        },
    )
    .boxed()
}
