//! Classification of inbound peer lines.
//!
//! A single parsing step turns raw text into a [`Line`] variant; the session
//! state machine never does substring checks of its own.

/// Marker substring signalling that the peer began executing a command.
///
/// Matched anywhere in the line, not only as a prefix: the peer's
/// interactive prompt can precede the marker on the first echoed line.
pub const OPEN_MARKER: &str = "COMMAND";

/// Marker prefix signalling that a command fully completed.
pub const CLOSE_MARKER: &str = "DONE";

/// Notification marker prefix.
const NOTIFY_MARKER: &str = "NOTIFY";

/// Fixed width stripped from a notification line to obtain the payload
/// name: the marker plus one separating space.
pub const NOTIFY_PREFIX_LEN: usize = 7;

/// One inbound line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Structural open: the peer entered a (possibly nested) command.
    Open,
    /// Structural close: a command finished. Terminates the current send.
    Close,
    /// Out-of-band notification carrying a payload name.
    Notification(String),
    /// Anything else: candidate return value or diagnostic text.
    Payload(String),
}

/// Classify a raw line.
///
/// Check order matters and matches the peer's conventions: the notification
/// prefix wins over everything, the open marker is matched as a substring
/// before the close prefix is tried.
pub fn classify(raw: &str) -> Line {
    if raw.starts_with(NOTIFY_MARKER) {
        let name = raw.get(NOTIFY_PREFIX_LEN..).unwrap_or("");
        return Line::Notification(name.to_string());
    }
    if raw.contains(OPEN_MARKER) {
        return Line::Open;
    }
    if raw.starts_with(CLOSE_MARKER) {
        return Line::Close;
    }
    Line::Payload(raw.to_string())
}
