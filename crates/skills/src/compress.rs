//! Skill compression: a reduced-fidelity rendering of a skill body.
//!
//! The outline keeps every markdown heading plus the first sentence of the
//! first prose line under each heading (and of any preamble). Fenced code
//! blocks are dropped. If the outline is still longer than half the original
//! character count it is cut to that length at a word boundary and marked
//! with `…`, so a compressed body never exceeds half the original size.

/// Compress skill content to at most half its character count.
pub fn compress(content: &str) -> String {
    let limit = content.chars().count() / 2;
    let outline = outline(content);
    if outline.chars().count() <= limit {
        outline
    } else {
        truncate_at_word(&outline, limit)
    }
}

/// Headings plus the lead sentence of each section.
fn outline(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut need_lead = true;
    let mut in_fence = false;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("```") || line.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            kept.push(line);
            need_lead = true;
        } else if need_lead {
            kept.push(first_sentence(line));
            need_lead = false;
        }
    }

    kept.join("\n")
}

/// The text up to and including the first `.`, `!` or `?` that ends a
/// sentence, or the whole line when there is none.
fn first_sentence(line: &str) -> &str {
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                return &line[..i + c.len_utf8()];
            }
        }
    }
    line
}

/// Cut `text` to at most `max_chars` characters, preferring a word
/// boundary, with a trailing `…` counted inside the limit.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let room = max_chars.saturating_sub(1);
    if room == 0 {
        return String::new();
    }

    let end = text
        .char_indices()
        .nth(room)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let mut cut = &text[..end];
    if let Some(space) = cut.rfind(char::is_whitespace).filter(|&s| s > 0) {
        cut = &cut[..space];
    }
    let cut = cut.trim_end();
    if cut.is_empty() {
        return String::new();
    }
    format!("{cut}…")
}
