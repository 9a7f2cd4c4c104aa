//! Long-line rewrapping.
//!
//! Lengths and offsets are counted in characters, not bytes.

use crate::classify::{is_emphasis_line, is_fence_marker, is_heading, is_list_item, is_table_row};
use crate::config::FixConfig;

/// Break characters in priority order. `keep` means the character stays at
/// the end of the first line; otherwise it is dropped at the break.
const BREAK_CLASSES: &[(&[char], bool)] = &[
    (&['.', '!', '?'], true),
    (&[','], true),
    (&[';'], true),
    (&[' '], false),
    (&['-'], true),
];

/// The subset of [`FixConfig`] that shapes a wrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapPolicy {
    pub max_line_length: usize,
    pub break_fraction: f64,
    pub url_length_factor: f64,
}

impl From<&FixConfig> for WrapPolicy {
    fn from(config: &FixConfig) -> Self {
        Self {
            max_line_length: config.max_line_length,
            break_fraction: config.break_fraction,
            url_length_factor: config.url_length_factor,
        }
    }
}

impl Default for WrapPolicy {
    fn default() -> Self {
        WrapPolicy::from(&FixConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BreakPoint {
    /// End (exclusive) of the first part.
    head_end: usize,
    /// Start of the continuation.
    tail_start: usize,
}

/// Split an over-long line into its first part and indented continuations.
///
/// Every continuation is indented two spaces deeper than `line` and is split
/// again until it fits or has no usable break, so the result is stable under
/// a second call on any of its pieces. Returns `None` when the line fits, is
/// not safe to split (heading, fence, table row, short-enough URL line), or
/// has no usable break.
pub fn wrap_line(line: &str, policy: &WrapPolicy) -> Option<Vec<String>> {
    if is_heading(line) {
        return None;
    }
    let (head, mut rest) = split_once(line, policy)?;
    let indent: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();

    let mut pieces = vec![head];
    loop {
        let continuation = format!("{indent}  {rest}");
        match split_once(&continuation, policy) {
            Some((head, tail)) => {
                pieces.push(head);
                rest = tail;
            }
            None => {
                pieces.push(continuation);
                return Some(pieces);
            }
        }
    }
}

/// One break: the first part (indent kept, right-trimmed) and the remaining
/// text with its leading whitespace removed.
fn split_once(line: &str, policy: &WrapPolicy) -> Option<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let max = policy.max_line_length;
    if max == 0 || chars.len() <= max {
        return None;
    }
    if is_fence_marker(line) || is_table_row(line) {
        return None;
    }
    if line.contains("://") && (chars.len() as f64) < max as f64 * policy.url_length_factor {
        return None;
    }

    let point = choose_break(&chars, max, policy.break_fraction)?;
    Some(parts(&chars, point))
}

fn parts(chars: &[char], point: BreakPoint) -> (String, String) {
    let head: String = chars[..point.head_end].iter().collect();
    let tail: String = chars[point.tail_start..].iter().collect();
    (
        head.trim_end_matches([' ', '\t']).to_string(),
        tail.trim_start_matches([' ', '\t']).to_string(),
    )
}

/// A break is usable when both sides keep visible text and neither side
/// reads as a different block once split: the continuation must not open a
/// list, heading, table or fence, and the first part must not become a
/// whole-line emphasis.
fn usable(chars: &[char], point: BreakPoint) -> bool {
    let (head, tail) = parts(chars, point);
    !head.trim().is_empty()
        && !tail.is_empty()
        && !is_emphasis_line(&head)
        && !is_fence_marker(&tail)
        && !is_list_item(&tail)
        && !is_heading(&tail)
        && !is_table_row(&tail)
}

fn choose_break(chars: &[char], max: usize, fraction: f64) -> Option<BreakPoint> {
    let threshold = max as f64 * fraction;
    for &(class, keep) in BREAK_CLASSES {
        // A kept character must still fit on the first line.
        let limit = if keep { max - 1 } else { max };
        let found = (0..=limit.min(chars.len() - 1))
            .rev()
            .take_while(|&i| i as f64 > threshold)
            .filter(|&i| class.contains(&chars[i]) && (!keep || is_word_end(chars, i)))
            .map(|i| {
                if keep {
                    BreakPoint {
                        head_end: i + 1,
                        tail_start: i + 1,
                    }
                } else {
                    BreakPoint {
                        head_end: i,
                        tail_start: i + 1,
                    }
                }
            })
            .find(|&point| usable(chars, point));
        if found.is_some() {
            return found;
        }
    }
    let hard = BreakPoint {
        head_end: max,
        tail_start: max,
    };
    usable(chars, hard).then_some(hard)
}

/// Punctuation only counts as a break when it ends a word, so `1.5` and
/// `example.com` stay whole. Hyphens may split compound words.
fn is_word_end(chars: &[char], i: usize) -> bool {
    if chars[i] == '-' {
        return i > 0 && !chars[i - 1].is_whitespace();
    }
    chars.get(i + 1).map_or(true, |c| c.is_whitespace())
}
