//! HTML rendering of transcripts
//!
//! Output is a fragment: one scrollable container holding one block per turn,
//! followed by a directive that scrolls the host chat panel to the bottom.
//! Rendering is a pure function of the turns it is given.

use crate::transcript::{speaker_color, Turn};
use crate::{DuetError, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;

/// CSS selector of the scrollable panel the fragment is injected into.
/// The fragment itself never scrolls; the panel is the only scroll container.
pub const CHAT_PANEL_SELECTOR: &str = ".duet-chat";

/// Class carried by every rendered turn block
pub const TURN_CLASS: &str = "duet-turn";

const TRANSCRIPT_TEMPLATE: &str = concat!(
    "<div class=\"duet-transcript\" style=\"display: flow-root; padding-bottom: 8px;\">",
    "{{#each turns}}",
    "<div class=\"duet-turn\" style=\"padding: 10px; margin: 5px; border-radius: 10px; ",
    "background-color: {{this.color}};\"><b>{{this.speaker}}:</b> {{this.content}}</div>",
    "{{/each}}",
    "</div>{{{autoscroll}}}"
);

const NOTICE_TEMPLATE: &str =
    "<div class=\"duet-notice\" style=\"text-align: center; color: #666;\">{{text}}</div>";

/// Scroll the chat panel to its last block. The hidden image repeats the
/// script because fragments inserted through `innerHTML` never run scripts.
fn autoscroll_directive() -> String {
    let js = format!(
        "var el=document.querySelector('{}');if(el){{el.scrollTop=el.scrollHeight;}}",
        CHAT_PANEL_SELECTOR
    );
    format!(
        "<script>(function(){{{js}}})();</script><img src=x onerror=\"{js}\" style=display:none>"
    )
}

#[derive(Serialize)]
struct TurnView<'a> {
    speaker: &'a str,
    content: &'a str,
    color: &'static str,
}

#[derive(Serialize)]
struct TranscriptView<'a> {
    turns: Vec<TurnView<'a>>,
    autoscroll: String,
}

/// Renders turns into the chat panel fragment
#[derive(Clone)]
pub struct TranscriptRenderer {
    handlebars: Arc<Handlebars<'static>>,
}

impl TranscriptRenderer {
    /// Create a renderer; speaker and content are HTML-escaped
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        Self {
            handlebars: Arc::new(handlebars),
        }
    }

    /// Render turns, in order, as one container
    pub fn render(&self, turns: &[Turn]) -> Result<String> {
        let view = TranscriptView {
            turns: turns
                .iter()
                .map(|turn| TurnView {
                    speaker: turn.speaker(),
                    content: turn.content(),
                    color: speaker_color(turn.speaker()),
                })
                .collect(),
            autoscroll: autoscroll_directive(),
        };
        self.handlebars
            .render_template(TRANSCRIPT_TEMPLATE, &view)
            .map_err(|e| DuetError::template(e.to_string()))
    }

    /// Render a centered status line in place of a transcript
    pub fn render_notice(&self, text: &str) -> Result<String> {
        self.handlebars
            .render_template(NOTICE_TEMPLATE, &serde_json::json!({ "text": text }))
            .map_err(|e| DuetError::template(e.to_string()))
    }
}

impl Default for TranscriptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Count turn blocks in a rendered fragment
pub fn count_turn_blocks(html: &str) -> usize {
    html.matches(&format!("class=\"{}\"", TURN_CLASS)).count()
}
