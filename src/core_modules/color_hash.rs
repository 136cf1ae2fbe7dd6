// THEORY:
// The background of a field is a fingerprint of its seed identifier. Hashing
// the identifier with SHA-256 and keeping the first three bytes gives a color
// that is stable across restarts and effectively unique per identifier.

use image::Rgb;
use sha2::{Digest, Sha256};

/// How much brighter the grid outlines are than the background, per channel.
pub const GRID_LINE_LIFT: u8 = 25;

/// Derives the background color for an identifier.
pub fn hash_color(identifier: &str) -> Rgb<u8> {
    let digest = Sha256::digest(identifier.as_bytes());
    Rgb([digest[0], digest[1], digest[2]])
}

/// The grid outline color for a given background: each channel lifted, capped at 255.
pub fn grid_line_color(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0;
    Rgb([
        r.saturating_add(GRID_LINE_LIFT),
        g.saturating_add(GRID_LINE_LIFT),
        b.saturating_add(GRID_LINE_LIFT),
    ])
}
