// View state - presentation mode, fetch generations, projections
//
// The interpreter is stateless; everything a viewer needs to remember (which
// transcript is open, which mode is active, which fetch is newest) lives in a
// ViewState value owned by the caller. Projections are recomputed from the
// loaded transcript on every call and never mutate it.

use crate::events::RenderableMessage;
use crate::interpreter::Interpreter;
use crate::transcripts::Transcript;
use crate::util::escape_html;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Formatted (interpreted) or raw (verbatim) transcript view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    #[default]
    Formatted,
    Raw,
}

impl PresentationMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Formatted => Self::Raw,
            Self::Raw => Self::Formatted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formatted => "formatted",
            Self::Raw => "raw",
        }
    }
}

impl FromStr for PresentationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "formatted" => Ok(Self::Formatted),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown mode '{}' (use formatted or raw)", other)),
        }
    }
}

impl fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the presentation layer draws for one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Projection {
    Formatted { messages: Vec<RenderableMessage> },
    /// Pretty-printed original content array, bypassing the interpreter
    Raw { raw: String },
}

/// Project a transcript in the given mode
pub fn project(
    transcript: &Transcript,
    mode: PresentationMode,
    interpreter: &Interpreter,
) -> Projection {
    match mode {
        PresentationMode::Formatted => Projection::Formatted {
            messages: interpreter.interpret(&transcript.content),
        },
        PresentationMode::Raw => Projection::Raw {
            raw: transcript.pretty_content(),
        },
    }
}

// ============================================================================
// Fetch generations
// ============================================================================

/// Ticket handed out when a fetch starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Request generation counter
///
/// Every fetch takes a ticket. A completed fetch may be applied only if no
/// newer ticket has already been applied, so a slow stale response can never
/// overwrite a fresher one.
#[derive(Debug, Default)]
pub struct FetchGeneration {
    issued: u64,
    applied: u64,
}

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// True if `ticket` is the most recently issued one
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Mark `ticket` as applied; false when a newer ticket already was
    pub fn accept(&mut self, ticket: FetchTicket) -> bool {
        if ticket.0 > self.applied && ticket.0 <= self.issued {
            self.applied = ticket.0;
            true
        } else {
            false
        }
    }

    /// Reject every ticket issued so far
    pub fn invalidate(&mut self) {
        self.applied = self.issued;
    }
}

// ============================================================================
// View state
// ============================================================================

/// State of a transcript viewer: list view when no transcript is open
#[derive(Debug, Default)]
pub struct ViewState {
    current: Option<Transcript>,
    mode: PresentationMode,
    generation: FetchGeneration,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading a transcript; pass the ticket to [`ViewState::open`]
    pub fn begin_open(&mut self) -> FetchTicket {
        self.generation.begin()
    }

    /// Show a fetched transcript unless a newer open already won
    pub fn open(&mut self, ticket: FetchTicket, transcript: Transcript) -> bool {
        if !self.generation.accept(ticket) {
            tracing::debug!(
                "Discarding stale transcript {} (ticket {:?})",
                transcript.filename,
                ticket
            );
            return false;
        }
        self.current = Some(transcript);
        true
    }

    /// Return to the list; in-flight opens are discarded when they land
    #[allow(dead_code)] // CLI views are one-shot; kept for interactive viewers
    pub fn close(&mut self) {
        self.current = None;
        self.mode = PresentationMode::Formatted;
        self.generation.invalidate();
    }

    pub fn toggle_mode(&mut self) -> PresentationMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn current(&self) -> Option<&Transcript> {
        self.current.as_ref()
    }

    /// Projection of the open transcript in the active mode
    pub fn projection(&self, interpreter: &Interpreter) -> Option<Projection> {
        self.current
            .as_ref()
            .map(|transcript| project(transcript, self.mode, interpreter))
    }
}

// ============================================================================
// HTML output
// ============================================================================

/// Render a projection as HTML blocks
///
/// Message bodies are already sanitized; kind and labels are escaped here.
pub fn render_html(projection: &Projection) -> String {
    match projection {
        Projection::Raw { raw } => {
            format!("<div class=\"raw-json\">{}</div>\n", escape_html(raw))
        }
        Projection::Formatted { messages } => {
            let mut html = String::from("<div class=\"stream-messages\">\n");
            for message in messages {
                html.push_str(&render_message(message));
            }
            html.push_str("</div>\n");
            html
        }
    }
}

fn render_message(message: &RenderableMessage) -> String {
    let kind = escape_html(&message.kind);
    let label = escape_html(message.display_type.as_str());
    let time = message
        .timestamp
        .as_ref()
        .map(|ts| format!("<span class=\"message-time\">{}</span>", ts))
        .unwrap_or_default();

    format!(
        "<div class=\"stream-message {kind}\" data-type=\"{label}\">\
         <div class=\"message-header\"><span class=\"message-type\">{label}</span>{time}</div>\
         <div class=\"message-content\">{body}</div></div>\n",
        kind = kind,
        label = label,
        time = time,
        body = message.body
    )
}
