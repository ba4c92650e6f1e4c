//! Search-match highlighting for patient names.
//!
//! The query is matched literally and case-insensitively; it is never
//! treated as a pattern, so input like `(` or `.*` is harmless.

#[cfg(test)]
#[path = "highlight_test.rs"]
mod highlight_test;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Match(String),
}

/// Split `name` into plain and matched segments for `query`.
#[must_use]
pub fn highlight_match(name: &str, query: &str) -> Vec<Segment> {
    let needle = query.trim();
    if needle.is_empty() {
        return vec![Segment::Plain(name.to_owned())];
    }

    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < chars.len() {
        if let Some(len) = match_len_at(&chars[i..], &needle) {
            let start = chars[i].0;
            let end = chars.get(i + len).map_or(name.len(), |(offset, _)| *offset);
            if plain_start < start {
                segments.push(Segment::Plain(name[plain_start..start].to_owned()));
            }
            segments.push(Segment::Match(name[start..end].to_owned()));
            plain_start = end;
            i += len;
        } else {
            i += 1;
        }
    }
    if plain_start < name.len() {
        segments.push(Segment::Plain(name[plain_start..].to_owned()));
    }
    segments
}

/// Number of name chars consumed if `needle` matches at the start of `chars`.
fn match_len_at(chars: &[(usize, char)], needle: &[char]) -> Option<usize> {
    let mut consumed = 0;
    let mut matched = 0;
    while matched < needle.len() {
        let (_, c) = chars.get(consumed)?;
        for lower in c.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        consumed += 1;
    }
    Some(consumed)
}

/// Render segments as plain text, wrapping matches in brackets.
#[must_use]
pub fn render_brackets(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text.clone(),
            Segment::Match(text) => format!("[{text}]"),
        })
        .collect()
}
