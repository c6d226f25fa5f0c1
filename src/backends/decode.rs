// src/backends/decode.rs

//! Decodes console input bytes into curses key codes.

use crate::keys::code;

use log::trace;

/// Result of matching the bytes that follow an ESC.
enum Escape {
    /// A recognized key and the number of bytes consumed after the ESC.
    Key(i32, usize),
    /// A well-formed sequence with no key mapping; swallowed.
    Ignored(usize),
}

fn arrow(final_byte: u8) -> i32 {
    match final_byte {
        b'A' => code::UP,
        b'B' => code::DOWN,
        b'C' => code::RIGHT,
        _ => code::LEFT,
    }
}

/// Maps the numeric parameter of `ESC [ n ~` onto a function key.
fn tilde_function_key(n: u32) -> Option<i32> {
    let f = match n {
        11..=15 => n - 10,
        17..=21 => n - 11,
        23 | 24 => n - 12,
        _ => return None,
    };
    Some(code::f(f as i32))
}

fn match_escape(rest: &[u8]) -> Option<Escape> {
    match rest {
        [b'[' | b'O', c @ b'A'..=b'D', ..] => Some(Escape::Key(arrow(*c), 2)),
        [b'O', c @ b'P'..=b'S', ..] => Some(Escape::Key(code::F1 + (c - b'P') as i32, 2)),
        [b'[', params @ ..] => {
            let digits = params.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 || params.get(digits) != Some(&b'~') {
                return None;
            }
            let n: u32 = params[..digits]
                .iter()
                .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as u32));
            let consumed = 1 + digits + 1;
            Some(match tilde_function_key(n) {
                Some(key) => Escape::Key(key, consumed),
                None => Escape::Ignored(consumed),
            })
        }
        _ => None,
    }
}

/// Decodes one read's worth of bytes, appending key codes to `out`.
///
/// An ESC not followed by a recognized sequence is reported as a lone
/// escape (27) and the following bytes are decoded on their own.
pub fn decode_keys(bytes: &[u8], out: &mut Vec<i32>) {
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        i += 1;
        match byte {
            0x1b => match match_escape(&bytes[i..]) {
                Some(Escape::Key(key, consumed)) => {
                    trace!("decode_keys: escape sequence -> key {}", key);
                    out.push(key);
                    i += consumed;
                }
                Some(Escape::Ignored(consumed)) => {
                    trace!(
                        "decode_keys: ignoring escape sequence {:?}",
                        String::from_utf8_lossy(&bytes[i..i + consumed])
                    );
                    i += consumed;
                }
                None => out.push(code::ESCAPE),
            },
            b'\r' => out.push(code::LINE_FEED),
            other => out.push(other as i32),
        }
    }
}
