// Mirrorboard Key Type
// Represents a single key code from Linux input-event-codes.h

use std::fmt;
use std::str::FromStr;

/// Represents a single keyboard key code.
///
/// This is a newtype wrapper around u16 for type safety.
/// The numeric values match Linux input-event-codes.h definitions, so any
/// code a device reports is a valid `Key`, named or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

macro_rules! named_keys {
    ($($name:ident = $code:expr),* $(,)?) => {
        impl Key {
            $(pub const $name: Key = Key($code);)*
        }

        const NAMED_KEYS: &[(&str, Key)] = &[$((stringify!($name), Key($code))),*];
    };
}

named_keys! {
    ESC = 1,
    KEY_1 = 2,
    KEY_2 = 3,
    KEY_3 = 4,
    KEY_4 = 5,
    KEY_5 = 6,
    KEY_6 = 7,
    KEY_7 = 8,
    KEY_8 = 9,
    KEY_9 = 10,
    KEY_0 = 11,
    MINUS = 12,
    EQUAL = 13,
    BACKSPACE = 14,
    TAB = 15,
    Q = 16,
    W = 17,
    E = 18,
    R = 19,
    T = 20,
    Y = 21,
    U = 22,
    I = 23,
    O = 24,
    P = 25,
    LEFT_BRACE = 26,
    RIGHT_BRACE = 27,
    ENTER = 28,
    LEFT_CTRL = 29,
    A = 30,
    S = 31,
    D = 32,
    F = 33,
    G = 34,
    H = 35,
    J = 36,
    K = 37,
    L = 38,
    SEMICOLON = 39,
    APOSTROPHE = 40,
    GRAVE = 41,
    LEFT_SHIFT = 42,
    BACKSLASH = 43,
    Z = 44,
    X = 45,
    C = 46,
    V = 47,
    B = 48,
    N = 49,
    M = 50,
    COMMA = 51,
    DOT = 52,
    SLASH = 53,
    RIGHT_SHIFT = 54,
    LEFT_ALT = 56,
    SPACE = 57,
    CAPSLOCK = 58,
    F1 = 59,
    F2 = 60,
    F3 = 61,
    F4 = 62,
    F5 = 63,
    F6 = 64,
    F7 = 65,
    F8 = 66,
    F9 = 67,
    F10 = 68,
    F11 = 87,
    F12 = 88,
    RIGHT_CTRL = 97,
    RIGHT_ALT = 100,
    HOME = 102,
    UP = 103,
    PAGE_UP = 104,
    LEFT = 105,
    RIGHT = 106,
    END = 107,
    DOWN = 108,
    PAGE_DOWN = 109,
    INSERT = 110,
    DELETE = 111,
    LEFT_META = 125,
    RIGHT_META = 126,
    MENU = 139,
}

/// Aliases accepted on the command line in addition to the canonical names
const KEY_ALIASES: &[(&str, Key)] = &[
    ("ESCAPE", Key::ESC),
    ("1", Key::KEY_1),
    ("2", Key::KEY_2),
    ("3", Key::KEY_3),
    ("4", Key::KEY_4),
    ("5", Key::KEY_5),
    ("6", Key::KEY_6),
    ("7", Key::KEY_7),
    ("8", Key::KEY_8),
    ("9", Key::KEY_9),
    ("0", Key::KEY_0),
    ("LEFTBRACE", Key::LEFT_BRACE),
    ("RIGHTBRACE", Key::RIGHT_BRACE),
    ("LEFTCTRL", Key::LEFT_CTRL),
    ("RIGHTCTRL", Key::RIGHT_CTRL),
    ("LEFTSHIFT", Key::LEFT_SHIFT),
    ("RIGHTSHIFT", Key::RIGHT_SHIFT),
    ("LEFTALT", Key::LEFT_ALT),
    ("RIGHTALT", Key::RIGHT_ALT),
    ("LEFTMETA", Key::LEFT_META),
    ("RIGHTMETA", Key::RIGHT_META),
    ("PAGEUP", Key::PAGE_UP),
    ("PAGEDOWN", Key::PAGE_DOWN),
];

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key, or "UNKNOWN" for codes outside the named set
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match key_name(self.0) {
            "UNKNOWN" => write!(f, "KEY({})", self.0),
            name => f.write_str(name),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    NAMED_KEYS
        .iter()
        .find(|(_, key)| key.0 == code)
        .map(|(name, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Try to parse a key name to a key code.
///
/// Matching is case-insensitive and accepts the evdev spelling with a
/// `KEY_` prefix, so `space`, `SPACE` and `KEY_SPACE` all resolve.
pub fn key_from_name(name: &str) -> Option<Key> {
    let upper = name.trim().to_uppercase();
    lookup(&upper).or_else(|| upper.strip_prefix("KEY_").and_then(lookup))
}

fn lookup(name: &str) -> Option<Key> {
    NAMED_KEYS
        .iter()
        .chain(KEY_ALIASES)
        .find(|(n, _)| *n == name)
        .map(|(_, key)| *key)
}
