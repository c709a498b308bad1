//! Key model and the escape-sequence table.
//!
//! The table is a sorted list of `(bytes, key)` pairs. Lookup is a binary
//! search for the first entry `>=` the pending buffer, which tells us in one
//! step whether the buffer is a complete sequence, a prefix of one, or neither.

use std::fmt;

/// A decoded logical keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    Char(char),
    /// Ctrl + letter or punctuation, e.g. `Ctrl('c')` for byte 0x03.
    Ctrl(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    /// Byte 0x00 (Ctrl-Space / Ctrl-@).
    Null,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    F(u8),
    /// Cursor key reported with a modifier, e.g. `ESC [1;5A` for Ctrl-Up.
    Modified(Modifiers, CursorKey),
    /// A byte that is not valid UTF-8 on its own.
    Byte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// Modifier bits as xterm encodes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const ALT: Modifiers = Modifiers(2);
    pub const CTRL: Modifiers = Modifiers(4);

    /// From the CSI parameter, which is 1 + the bitmask.
    pub const fn from_param(param: u8) -> Self {
        Modifiers(param.saturating_sub(1) & 0x07)
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bit, name) in [(Self::CTRL, "Ctrl-"), (Self::ALT, "Alt-"), (Self::SHIFT, "Shift-")] {
            if self.contains(bit) {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

impl KeyEvent {
    /// Key for a single byte below 0x80 that is not ESC.
    pub fn from_ascii(byte: u8) -> Self {
        match byte {
            0x00 => KeyEvent::Null,
            0x08 | 0x7F => KeyEvent::Backspace,
            0x09 => KeyEvent::Tab,
            0x0D => KeyEvent::Enter,
            0x1B => KeyEvent::Escape,
            0x01..=0x1A => KeyEvent::Ctrl(char::from(b'a' + byte - 1)),
            0x1C..=0x1F => KeyEvent::Ctrl(char::from(byte + 0x40)),
            0x20..=0x7E => KeyEvent::Char(char::from(byte)),
            _ => KeyEvent::Byte(byte),
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Char(c) => write!(f, "{c:?}"),
            KeyEvent::Ctrl(c) => write!(f, "Ctrl-{}", c.to_ascii_uppercase()),
            KeyEvent::F(n) => write!(f, "F{n}"),
            KeyEvent::Byte(b) => write!(f, "0x{b:02X}"),
            KeyEvent::Modified(mods, key) => write!(f, "{mods}{key:?}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Known escape sequences, sorted by byte string. No entry is a strict
/// prefix of another.
pub static ESCAPE_SEQUENCES: &[(&[u8], KeyEvent)] = &[
    // SS3 (application cursor mode, xterm F1-F4)
    (b"\x1bOA", KeyEvent::Up),
    (b"\x1bOB", KeyEvent::Down),
    (b"\x1bOC", KeyEvent::Right),
    (b"\x1bOD", KeyEvent::Left),
    (b"\x1bOF", KeyEvent::End),
    (b"\x1bOH", KeyEvent::Home),
    (b"\x1bOP", KeyEvent::F(1)),
    (b"\x1bOQ", KeyEvent::F(2)),
    (b"\x1bOR", KeyEvent::F(3)),
    (b"\x1bOS", KeyEvent::F(4)),
    // CSI
    (b"\x1b[11~", KeyEvent::F(1)),
    (b"\x1b[12~", KeyEvent::F(2)),
    (b"\x1b[13~", KeyEvent::F(3)),
    (b"\x1b[14~", KeyEvent::F(4)),
    (b"\x1b[15~", KeyEvent::F(5)),
    (b"\x1b[17~", KeyEvent::F(6)),
    (b"\x1b[18~", KeyEvent::F(7)),
    (b"\x1b[19~", KeyEvent::F(8)),
    // xterm modified cursor keys: ESC [1;<1 + mask><final>
    (b"\x1b[1;2A", KeyEvent::Modified(Modifiers::from_param(2), CursorKey::Up)),
    (b"\x1b[1;2B", KeyEvent::Modified(Modifiers::from_param(2), CursorKey::Down)),
    (b"\x1b[1;2C", KeyEvent::Modified(Modifiers::from_param(2), CursorKey::Right)),
    (b"\x1b[1;2D", KeyEvent::Modified(Modifiers::from_param(2), CursorKey::Left)),
    (b"\x1b[1;2F", KeyEvent::Modified(Modifiers::from_param(2), CursorKey::End)),
    (b"\x1b[1;2H", KeyEvent::Modified(Modifiers::from_param(2), CursorKey::Home)),
    (b"\x1b[1;3A", KeyEvent::Modified(Modifiers::from_param(3), CursorKey::Up)),
    (b"\x1b[1;3B", KeyEvent::Modified(Modifiers::from_param(3), CursorKey::Down)),
    (b"\x1b[1;3C", KeyEvent::Modified(Modifiers::from_param(3), CursorKey::Right)),
    (b"\x1b[1;3D", KeyEvent::Modified(Modifiers::from_param(3), CursorKey::Left)),
    (b"\x1b[1;3F", KeyEvent::Modified(Modifiers::from_param(3), CursorKey::End)),
    (b"\x1b[1;3H", KeyEvent::Modified(Modifiers::from_param(3), CursorKey::Home)),
    (b"\x1b[1;4A", KeyEvent::Modified(Modifiers::from_param(4), CursorKey::Up)),
    (b"\x1b[1;4B", KeyEvent::Modified(Modifiers::from_param(4), CursorKey::Down)),
    (b"\x1b[1;4C", KeyEvent::Modified(Modifiers::from_param(4), CursorKey::Right)),
    (b"\x1b[1;4D", KeyEvent::Modified(Modifiers::from_param(4), CursorKey::Left)),
    (b"\x1b[1;4F", KeyEvent::Modified(Modifiers::from_param(4), CursorKey::End)),
    (b"\x1b[1;4H", KeyEvent::Modified(Modifiers::from_param(4), CursorKey::Home)),
    (b"\x1b[1;5A", KeyEvent::Modified(Modifiers::from_param(5), CursorKey::Up)),
    (b"\x1b[1;5B", KeyEvent::Modified(Modifiers::from_param(5), CursorKey::Down)),
    (b"\x1b[1;5C", KeyEvent::Modified(Modifiers::from_param(5), CursorKey::Right)),
    (b"\x1b[1;5D", KeyEvent::Modified(Modifiers::from_param(5), CursorKey::Left)),
    (b"\x1b[1;5F", KeyEvent::Modified(Modifiers::from_param(5), CursorKey::End)),
    (b"\x1b[1;5H", KeyEvent::Modified(Modifiers::from_param(5), CursorKey::Home)),
    (b"\x1b[1;6A", KeyEvent::Modified(Modifiers::from_param(6), CursorKey::Up)),
    (b"\x1b[1;6B", KeyEvent::Modified(Modifiers::from_param(6), CursorKey::Down)),
    (b"\x1b[1;6C", KeyEvent::Modified(Modifiers::from_param(6), CursorKey::Right)),
    (b"\x1b[1;6D", KeyEvent::Modified(Modifiers::from_param(6), CursorKey::Left)),
    (b"\x1b[1;6F", KeyEvent::Modified(Modifiers::from_param(6), CursorKey::End)),
    (b"\x1b[1;6H", KeyEvent::Modified(Modifiers::from_param(6), CursorKey::Home)),
    (b"\x1b[1;7A", KeyEvent::Modified(Modifiers::from_param(7), CursorKey::Up)),
    (b"\x1b[1;7B", KeyEvent::Modified(Modifiers::from_param(7), CursorKey::Down)),
    (b"\x1b[1;7C", KeyEvent::Modified(Modifiers::from_param(7), CursorKey::Right)),
    (b"\x1b[1;7D", KeyEvent::Modified(Modifiers::from_param(7), CursorKey::Left)),
    (b"\x1b[1;7F", KeyEvent::Modified(Modifiers::from_param(7), CursorKey::End)),
    (b"\x1b[1;7H", KeyEvent::Modified(Modifiers::from_param(7), CursorKey::Home)),
    (b"\x1b[1;8A", KeyEvent::Modified(Modifiers::from_param(8), CursorKey::Up)),
    (b"\x1b[1;8B", KeyEvent::Modified(Modifiers::from_param(8), CursorKey::Down)),
    (b"\x1b[1;8C", KeyEvent::Modified(Modifiers::from_param(8), CursorKey::Right)),
    (b"\x1b[1;8D", KeyEvent::Modified(Modifiers::from_param(8), CursorKey::Left)),
    (b"\x1b[1;8F", KeyEvent::Modified(Modifiers::from_param(8), CursorKey::End)),
    (b"\x1b[1;8H", KeyEvent::Modified(Modifiers::from_param(8), CursorKey::Home)),
    (b"\x1b[1~", KeyEvent::Home),
    (b"\x1b[20~", KeyEvent::F(9)),
    (b"\x1b[21~", KeyEvent::F(10)),
    (b"\x1b[23~", KeyEvent::F(11)),
    (b"\x1b[24~", KeyEvent::F(12)),
    (b"\x1b[2~", KeyEvent::Insert),
    (b"\x1b[3~", KeyEvent::Delete),
    (b"\x1b[4~", KeyEvent::End),
    (b"\x1b[5~", KeyEvent::PageUp),
    (b"\x1b[6~", KeyEvent::PageDown),
    (b"\x1b[7~", KeyEvent::Home),
    (b"\x1b[8~", KeyEvent::End),
    (b"\x1b[A", KeyEvent::Up),
    (b"\x1b[B", KeyEvent::Down),
    (b"\x1b[C", KeyEvent::Right),
    (b"\x1b[D", KeyEvent::Left),
    (b"\x1b[F", KeyEvent::End),
    (b"\x1b[H", KeyEvent::Home),
    // Linux console F1-F5
    (b"\x1b[[A", KeyEvent::F(1)),
    (b"\x1b[[B", KeyEvent::F(2)),
    (b"\x1b[[C", KeyEvent::F(3)),
    (b"\x1b[[D", KeyEvent::F(4)),
    (b"\x1b[[E", KeyEvent::F(5)),
];

/// Result of matching a pending buffer against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMatch {
    /// The buffer is exactly a known sequence.
    Complete(KeyEvent),
    /// The buffer could still grow into a known sequence.
    Prefix,
    /// No known sequence starts with the buffer.
    None,
}

pub fn match_sequence(buf: &[u8]) -> SequenceMatch {
    let idx = ESCAPE_SEQUENCES.partition_point(|(seq, _)| *seq < buf);
    match ESCAPE_SEQUENCES.get(idx) {
        Some((seq, key)) if *seq == buf => SequenceMatch::Complete(*key),
        Some((seq, _)) if seq.starts_with(buf) => SequenceMatch::Prefix,
        _ => SequenceMatch::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_prefix_free() {
        for pair in ESCAPE_SEQUENCES.windows(2) {
            let (a, b) = (pair[0].0, pair[1].0);
            assert!(a < b, "table out of order at {a:?} / {b:?}");
            assert!(!b.starts_with(a), "{a:?} is a prefix of {b:?}");
        }
    }

    #[test]
    fn test_match_sequence() {
        assert_eq!(match_sequence(b"\x1b[A"), SequenceMatch::Complete(KeyEvent::Up));
        assert_eq!(match_sequence(b"\x1b[24~"), SequenceMatch::Complete(KeyEvent::F(12)));
        assert_eq!(match_sequence(b"\x1b"), SequenceMatch::Prefix);
        assert_eq!(match_sequence(b"\x1b[1"), SequenceMatch::Prefix);
        assert_eq!(match_sequence(b"\x1b[Z"), SequenceMatch::None);
        assert_eq!(match_sequence(b"\x1bx"), SequenceMatch::None);
    }

    #[test]
    fn test_modified_cursor_keys() {
        let ctrl_up = KeyEvent::Modified(Modifiers::CTRL, CursorKey::Up);
        assert_eq!(match_sequence(b"\x1b[1;5A"), SequenceMatch::Complete(ctrl_up));
        assert_eq!(match_sequence(b"\x1b[1;"), SequenceMatch::Prefix);
        assert_eq!(match_sequence(b"\x1b[1;5"), SequenceMatch::Prefix);
        assert_eq!(match_sequence(b"\x1b[1;9A"), SequenceMatch::None);
        assert_eq!(ctrl_up.to_string(), "Ctrl-Up");

        let KeyEvent::Modified(mods, CursorKey::End) = find(b"\x1b[1;8F") else {
            panic!("expected modified End");
        };
        assert_eq!(mods.to_string(), "Ctrl-Alt-Shift-");
        assert_eq!(
            find(b"\x1b[1;2D"),
            KeyEvent::Modified(Modifiers::SHIFT, CursorKey::Left)
        );
    }

    fn find(seq: &[u8]) -> KeyEvent {
        match match_sequence(seq) {
            SequenceMatch::Complete(key) => key,
            other => panic!("{seq:?} did not match: {other:?}"),
        }
    }

    #[test]
    fn test_from_ascii_control_codes() {
        assert_eq!(KeyEvent::from_ascii(0x03), KeyEvent::Ctrl('c'));
        assert_eq!(KeyEvent::from_ascii(0x0A), KeyEvent::Ctrl('j'));
        assert_eq!(KeyEvent::from_ascii(0x0D), KeyEvent::Enter);
        assert_eq!(KeyEvent::from_ascii(0x7F), KeyEvent::Backspace);
        assert_eq!(KeyEvent::from_ascii(0x1D), KeyEvent::Ctrl(']'));
        assert_eq!(KeyEvent::from_ascii(b'h'), KeyEvent::Char('h'));
        assert_eq!(KeyEvent::from_ascii(0x00), KeyEvent::Null);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(KeyEvent::Ctrl('c').to_string(), "Ctrl-C");
        assert_eq!(KeyEvent::F(5).to_string(), "F5");
        assert_eq!(KeyEvent::Up.to_string(), "Up");
        assert_eq!(KeyEvent::Char('a').to_string(), "'a'");
        assert_eq!(KeyEvent::Byte(0xFF).to_string(), "0xFF");
    }
}
