//! Byte-to-keypress decoder.
//!
//! Every byte fed in is echoed once as `DecodedEvent::Raw`, always first.
//! With decoding enabled the decoder also emits `DecodedEvent::Key`:
//! - A plain byte resolves immediately (printable, Enter, Ctrl-letter, ...)
//! - ESC starts a pending sequence matched against the escape table
//! - A byte that cannot extend the pending prefix flushes the buffered bytes
//!   as literal keys, then matching restarts from that byte
//! - Multi-byte UTF-8 resolves when the character is complete
//!
//! A pending prefix that never completes is resolved by `flush()`, which the
//! caller runs on end of input or after the escape timeout.

use super::keys::{KeyEvent, SequenceMatch, match_sequence};

const ESC: u8 = 0x1B;

// =============================================================================
// Types
// =============================================================================

/// How a key was resolved from the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A key standing on its own: one byte, one UTF-8 character, or a lone ESC.
    Key,
    /// A complete entry of the escape table.
    Sequence,
    /// A literal byte flushed out of a prefix that did not resolve.
    Fallback,
}

/// A decoded key plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystroke {
    pub key: KeyEvent,
    pub resolution: Resolution,
    /// Number of input bytes this key covers.
    pub width: u8,
}

/// One output of the decoder, in stream order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedEvent {
    Raw(u8),
    Key(Keystroke),
}

// =============================================================================
// Decoder
// =============================================================================

/// Decoder state machine.
#[derive(Debug)]
pub struct InputDecoder {
    enabled: bool,
    /// Pending escape sequence, starting with ESC.
    seq: Vec<u8>,
    /// Pending UTF-8 character and the total length it needs.
    utf8: Vec<u8>,
    utf8_len: usize,
}

impl InputDecoder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seq: Vec::with_capacity(8),
            utf8: Vec::with_capacity(4),
            utf8_len: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True while bytes are buffered waiting for more input.
    pub fn has_pending(&self) -> bool {
        !self.seq.is_empty() || !self.utf8.is_empty()
    }

    /// Feed one byte.
    pub fn feed(&mut self, byte: u8, out: &mut Vec<DecodedEvent>) {
        out.push(DecodedEvent::Raw(byte));
        if self.enabled {
            self.advance(byte, out);
        }
    }

    /// Resolve anything pending. A lone ESC becomes an Escape keypress; any
    /// other buffered bytes become literal fallback keys.
    pub fn flush(&mut self, out: &mut Vec<DecodedEvent>) {
        if self.seq == [ESC] {
            self.seq.clear();
            emit(out, KeyEvent::Escape, Resolution::Key, 1);
        } else {
            self.flush_seq(out);
        }
        self.flush_utf8(out);
    }

    fn advance(&mut self, byte: u8, out: &mut Vec<DecodedEvent>) {
        if !self.seq.is_empty() {
            self.seq.push(byte);
            match match_sequence(&self.seq) {
                SequenceMatch::Complete(key) => {
                    let width = self.seq.len() as u8;
                    self.seq.clear();
                    emit(out, key, Resolution::Sequence, width);
                }
                SequenceMatch::Prefix => {}
                SequenceMatch::None => {
                    self.seq.pop();
                    self.flush_seq(out);
                    self.advance(byte, out);
                }
            }
            return;
        }

        if !self.utf8.is_empty() {
            if is_continuation(byte) {
                self.utf8.push(byte);
                if self.utf8.len() == self.utf8_len {
                    self.finish_utf8(out);
                }
            } else {
                self.flush_utf8(out);
                self.advance(byte, out);
            }
            return;
        }

        match byte {
            ESC => self.seq.push(byte),
            0x00..=0x7F => emit(out, KeyEvent::from_ascii(byte), Resolution::Key, 1),
            _ => match utf8_len(byte) {
                Some(len) => {
                    self.utf8.push(byte);
                    self.utf8_len = len;
                }
                None => emit(out, KeyEvent::Byte(byte), Resolution::Key, 1),
            },
        }
    }

    fn flush_seq(&mut self, out: &mut Vec<DecodedEvent>) {
        for byte in self.seq.drain(..) {
            emit(out, KeyEvent::from_ascii(byte), Resolution::Fallback, 1);
        }
    }

    fn flush_utf8(&mut self, out: &mut Vec<DecodedEvent>) {
        for byte in self.utf8.drain(..) {
            emit(out, KeyEvent::Byte(byte), Resolution::Fallback, 1);
        }
    }

    fn finish_utf8(&mut self, out: &mut Vec<DecodedEvent>) {
        let ch = std::str::from_utf8(&self.utf8)
            .ok()
            .and_then(|s| s.chars().next());
        match ch {
            Some(c) => {
                let width = self.utf8.len() as u8;
                self.utf8.clear();
                emit(out, KeyEvent::Char(c), Resolution::Key, width);
            }
            // Overlong or surrogate encodings
            None => self.flush_utf8(out),
        }
    }
}

fn emit(out: &mut Vec<DecodedEvent>, key: KeyEvent, resolution: Resolution, width: u8) {
    out.push(DecodedEvent::Key(Keystroke { key, resolution, width }));
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn utf8_len(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Vec<DecodedEvent> {
        let mut decoder = InputDecoder::new(true);
        let mut out = Vec::new();
        for &b in input {
            decoder.feed(b, &mut out);
        }
        decoder.flush(&mut out);
        out
    }

    fn keys(events: &[DecodedEvent]) -> Vec<(KeyEvent, Resolution)> {
        events
            .iter()
            .filter_map(|e| match e {
                DecodedEvent::Key(k) => Some((k.key, k.resolution)),
                DecodedEvent::Raw(_) => None,
            })
            .collect()
    }

    fn raw(events: &[DecodedEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                DecodedEvent::Raw(b) => Some(*b),
                DecodedEvent::Key(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_arrow_up_is_one_key() {
        let events = decode(b"\x1b[A");
        assert_eq!(keys(&events), vec![(KeyEvent::Up, Resolution::Sequence)]);
    }

    #[test]
    fn test_unmapped_sequence_falls_back_in_order() {
        let events = decode(b"\x1b[Z");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Escape, Resolution::Fallback),
                (KeyEvent::Char('['), Resolution::Fallback),
                (KeyEvent::Char('Z'), Resolution::Key),
            ]
        );
    }

    #[test]
    fn test_every_byte_appears_once_in_raw_stream() {
        let input = b"ab\x1b[A\x1b[Z\x1b\x1bOP\xc3\xa9\xff\x03\x1b[1".to_vec();
        let events = decode(&input);
        assert_eq!(raw(&events), input);
    }

    #[test]
    fn test_raw_precedes_keys_for_each_byte() {
        let mut decoder = InputDecoder::new(true);
        let mut out = Vec::new();
        decoder.feed(b'x', &mut out);
        assert_eq!(out[0], DecodedEvent::Raw(b'x'));
        assert!(matches!(out[1], DecodedEvent::Key(Keystroke { key: KeyEvent::Char('x'), .. })));
    }

    #[test]
    fn test_key_widths_cover_all_bytes() {
        let input = b"h\x1b[24~\x1b[Z\xe2\x82\xac\x1b";
        let events = decode(input);
        let total: usize = events
            .iter()
            .filter_map(|e| match e {
                DecodedEvent::Key(k) => Some(usize::from(k.width)),
                DecodedEvent::Raw(_) => None,
            })
            .sum();
        assert_eq!(total, input.len());
    }

    #[test]
    fn test_plain_byte_resolves_without_delay() {
        let mut decoder = InputDecoder::new(true);
        let mut out = Vec::new();
        decoder.feed(0x03, &mut out);
        assert!(!decoder.has_pending());
        assert_eq!(keys(&out), vec![(KeyEvent::Ctrl('c'), Resolution::Key)]);
    }

    #[test]
    fn test_lone_escape_waits_then_flushes_as_key() {
        let mut decoder = InputDecoder::new(true);
        let mut out = Vec::new();
        decoder.feed(0x1B, &mut out);
        assert!(decoder.has_pending());
        assert!(keys(&out).is_empty());

        decoder.flush(&mut out);
        assert!(!decoder.has_pending());
        assert_eq!(keys(&out), vec![(KeyEvent::Escape, Resolution::Key)]);
    }

    #[test]
    fn test_incomplete_sequence_at_end_flushes_literals() {
        let events = decode(b"\x1b[2");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Escape, Resolution::Fallback),
                (KeyEvent::Char('['), Resolution::Fallback),
                (KeyEvent::Char('2'), Resolution::Fallback),
            ]
        );
    }

    #[test]
    fn test_escape_restarts_matching() {
        let events = decode(b"\x1b\x1b[B");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Escape, Resolution::Fallback),
                (KeyEvent::Down, Resolution::Sequence),
            ]
        );
    }

    #[test]
    fn test_alt_chord_is_not_a_standalone_escape() {
        let events = decode(b"\x1bx");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Escape, Resolution::Fallback),
                (KeyEvent::Char('x'), Resolution::Key),
            ]
        );
    }

    #[test]
    fn test_function_keys() {
        let events = decode(b"\x1bOP\x1b[15~\x1b[[E");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::F(1), Resolution::Sequence),
                (KeyEvent::F(5), Resolution::Sequence),
                (KeyEvent::F(5), Resolution::Sequence),
            ]
        );
    }

    #[test]
    fn test_ctrl_arrow_is_one_key() {
        use crate::terminal::keys::{CursorKey, Modifiers};

        let events = decode(b"\x1b[1;5Cw");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Modified(Modifiers::CTRL, CursorKey::Right), Resolution::Sequence),
                (KeyEvent::Char('w'), Resolution::Key),
            ]
        );
        let widths: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                DecodedEvent::Key(k) => Some(k.width),
                DecodedEvent::Raw(_) => None,
            })
            .collect();
        assert_eq!(widths, vec![6, 1]);
    }

    #[test]
    fn test_utf8_character() {
        let events = decode("é€".as_bytes());
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Char('é'), Resolution::Key),
                (KeyEvent::Char('€'), Resolution::Key),
            ]
        );
    }

    #[test]
    fn test_broken_utf8_falls_back_to_bytes() {
        let events = decode(b"\xc3a\xff");
        assert_eq!(
            keys(&events),
            vec![
                (KeyEvent::Byte(0xC3), Resolution::Fallback),
                (KeyEvent::Char('a'), Resolution::Key),
                (KeyEvent::Byte(0xFF), Resolution::Key),
            ]
        );
    }

    #[test]
    fn test_disabled_decoder_emits_raw_only() {
        let mut decoder = InputDecoder::new(false);
        let mut out = Vec::new();
        for &b in b"\x1b[Aq" {
            decoder.feed(b, &mut out);
        }
        decoder.flush(&mut out);
        assert!(!decoder.has_pending());
        assert_eq!(raw(&out), b"\x1b[Aq".to_vec());
        assert!(keys(&out).is_empty());
    }
}
