//! Char code to glyph index mapping over the physical font's sorted
//! character table.
//!
//! Glyph index 0 is reserved to mean "not found", so stored indices are
//! offset by one: the glyph at position `n` of the char table has index
//! `n + 1`.

use crate::pfr::font::PfrChar;

pub fn char_index(chars: &[PfrChar], char_code: u32) -> u32 {
    let mut min = 0;
    let mut max = chars.len();

    while min < max {
        let mid = min + (max - min) / 2;
        let c = &chars[mid];

        if c.char_code == char_code {
            return mid as u32 + 1;
        }

        if c.char_code < char_code {
            min = mid + 1;
        } else {
            max = mid;
        }
    }

    0
}

/// Smallest valid char code strictly greater than `char_code`, with its
/// glyph index; `(0, 0)` when the table is exhausted.
pub fn char_next(chars: &[PfrChar], char_code: u32) -> (u32, u32) {
    let next = chars.partition_point(|c| c.char_code <= char_code);

    match chars.get(next) {
        Some(c) => (c.char_code, next as u32 + 1),
        None => (0, 0),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn chars(codes: &[u32]) -> Vec<PfrChar> {
        codes
            .iter()
            .map(|&char_code| PfrChar {
                char_code,
                advance: 0,
                gps_size: 0,
                gps_offset: 0,
            })
            .collect()
    }

    #[test]
    fn present_codes_map_to_offset_indices() {
        let chars = chars(&[32, 65, 66, 0x3042]);

        assert_eq!(char_index(&chars, 32), 1);
        assert_eq!(char_index(&chars, 65), 2);
        assert_eq!(char_index(&chars, 0x3042), 4);
    }

    #[test]
    fn absent_codes_map_to_zero() {
        let chars = chars(&[32, 65, 66]);

        assert_eq!(char_index(&chars, 0), 0);
        assert_eq!(char_index(&chars, 64), 0);
        assert_eq!(char_index(&chars, 1000), 0);
    }

    #[test]
    fn iteration_visits_every_char() {
        let chars = chars(&[32, 65, 66, 90]);

        let mut code = 0;
        let mut visited = Vec::new();

        loop {
            let (next, gindex) = char_next(&chars, code);
            if gindex == 0 {
                break;
            }
            visited.push((next, gindex));
            code = next;
        }

        assert_eq!(visited, vec![(32, 1), (65, 2), (66, 3), (90, 4)]);
    }

    #[test]
    fn next_from_gap_lands_on_following_code() {
        let chars = chars(&[32, 65, 90]);

        assert_eq!(char_next(&chars, 40), (65, 2));
        assert_eq!(char_next(&chars, 90), (0, 0));
    }
}
