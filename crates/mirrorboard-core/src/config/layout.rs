// Mirrorboard Built-in Layout
// Left/right mirrored QWERTY, one entry per unordered pair

use crate::Key;

/// Default mirror layout.
///
/// Each left-hand key is paired with its mirror image on the right-hand
/// side, and three edge keys swap with the editing keys at the far right.
pub const MIRROR_LAYOUT: &[(Key, Key)] = &[
    // number row
    (Key::KEY_1, Key::KEY_0),
    (Key::KEY_2, Key::KEY_9),
    (Key::KEY_3, Key::KEY_8),
    (Key::KEY_4, Key::KEY_7),
    (Key::KEY_5, Key::KEY_6),
    // first letter row
    (Key::Q, Key::P),
    (Key::W, Key::O),
    (Key::E, Key::I),
    (Key::R, Key::U),
    (Key::T, Key::Y),
    // home row
    (Key::A, Key::SEMICOLON),
    (Key::S, Key::L),
    (Key::D, Key::K),
    (Key::F, Key::J),
    (Key::G, Key::H),
    // bottom row
    (Key::Z, Key::SLASH),
    (Key::X, Key::DOT),
    (Key::C, Key::COMMA),
    (Key::V, Key::M),
    (Key::B, Key::N),
    // edges
    (Key::GRAVE, Key::BACKSPACE),
    (Key::CAPSLOCK, Key::ENTER),
    (Key::TAB, Key::BACKSLASH),
];
