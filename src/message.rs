//! Chat message wire convention
//!
//! A chat message is opaque UTF-8 text; the sender identity is embedded in
//! the text by convention as `"<name>: <text>"`. There are no structured
//! fields and no timestamp; ordering is purely arrival order at the relay.

use bytes::Bytes;

use crate::error::Result;

/// One chat message as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    line: String,
}

impl ChatMessage {
    /// Build a message in the `"<name>: <text>"` convention
    pub fn new(sender: &str, text: &str) -> Self {
        Self {
            line: format!("{}: {}", sender, text),
        }
    }

    /// Wrap an already-formatted line
    pub fn from_line(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    /// Parse a received payload, validating UTF-8.
    ///
    /// A malformed payload is a serialization error; the relay drops the
    /// offending connection and leaves the rest untouched.
    pub fn from_wire(payload: &Bytes) -> Result<Self> {
        let text = std::str::from_utf8(payload)?;
        Ok(Self {
            line: text.to_owned(),
        })
    }

    /// Sender name, if the line follows the `"<name>: <text>"` convention
    pub fn sender(&self) -> Option<&str> {
        self.line.split_once(": ").map(|(name, _)| name)
    }

    /// Message body, if the line follows the convention
    pub fn text(&self) -> Option<&str> {
        self.line.split_once(": ").map(|(_, text)| text)
    }

    /// The full line as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// The payload bytes for framing
    pub fn as_bytes(&self) -> &[u8] {
        self.line.as_bytes()
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_formats_convention() {
        let msg = ChatMessage::new("Alice", "hi");
        assert_eq!(msg.as_str(), "Alice: hi");
        assert_eq!(msg.sender(), Some("Alice"));
        assert_eq!(msg.text(), Some("hi"));
    }

    #[test]
    fn test_text_keeps_later_separators() {
        let msg = ChatMessage::new("Bob", "note: remember");
        assert_eq!(msg.sender(), Some("Bob"));
        assert_eq!(msg.text(), Some("note: remember"));
    }

    #[test]
    fn test_unconventional_line_has_no_sender() {
        let msg = ChatMessage::from_line("just text");
        assert_eq!(msg.sender(), None);
        assert_eq!(msg.as_str(), "just text");
    }

    #[test]
    fn test_from_wire_rejects_invalid_utf8() {
        let payload = Bytes::from_static(&[0xFF, 0xFE, 0x00]);
        assert!(ChatMessage::from_wire(&payload).is_err());
    }

    #[test]
    fn test_from_wire_roundtrip() {
        let original = ChatMessage::new("서버", "안녕하세요");
        let payload = Bytes::copy_from_slice(original.as_bytes());
        let parsed = ChatMessage::from_wire(&payload).unwrap();
        assert_eq!(parsed, original);
    }
}
