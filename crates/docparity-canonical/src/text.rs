use std::borrow::Cow;

/// Strips trailing whitespace the way the reference string `rstrip` does.
///
/// Besides Unicode white space this removes the information separators
/// U+001C..U+001F.
pub fn trim_trailing_whitespace(text: &str) -> &str {
    text.trim_end_matches(|c: char| c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c))
}

/// Translates `\r\n` and lone `\r` line endings to `\n`, as reading a file in
/// text mode does.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}
