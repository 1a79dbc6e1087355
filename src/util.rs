// util.rs — config parsing / path helpers

use std::path::{Path, PathBuf};

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Resolve `value` against the directory containing `relative_to`.
pub fn resolve_path(value: &str, relative_to: &Path) -> PathBuf {
    let p = PathBuf::from(value);
    if p.is_absolute() {
        p
    } else {
        relative_to.parent().unwrap_or(Path::new(".")).join(p)
    }
}

// ── Comment stripper ──────────────────────────────────────────────────────────
//
// A `#` starts a comment when it is at column 0 or preceded by whitespace,
// except when it is the first non-whitespace character of a value (a hex
// colour literal such as `background = #1E1E2E`). A space-separated list of
// colours (`palette = #aaaaaa #bbbbbb`) keeps every `#` that directly begins
// a six-digit hex token.

pub fn strip_comment(line: &str) -> &str {
    let Some(eq_pos) = line.find('=') else {
        return cut_at_comment(line, 0, |_| false);
    };

    let key_part = &line[..eq_pos];
    let key_cut = cut_at_comment(key_part, 0, |_| false);
    if key_cut.len() < key_part.len() {
        return key_cut;
    }

    cut_at_comment(line, eq_pos + 1, is_hex_token)
}

/// Cut `line` before the first comment `#` at or after `from`. `keep` sees the
/// text following a candidate `#` and may veto the cut.
fn cut_at_comment(line: &str, from: usize, keep: impl Fn(&str) -> bool) -> &str {
    let bytes = line.as_bytes();
    for i in from..bytes.len() {
        let at_boundary = i == 0 || i == from || bytes[i - 1].is_ascii_whitespace();
        if bytes[i] == b'#' && at_boundary && !keep(&line[i + 1..]) {
            return &line[..i];
        }
    }
    line
}

fn is_hex_token(rest: &str) -> bool {
    let token = rest.split_whitespace().next().unwrap_or("");
    !rest.starts_with(char::is_whitespace)
        && token.len() == 6
        && token.bytes().all(|b| b.is_ascii_hexdigit())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
