//! Text cleaning for speech synthesis.

/// Map typographic characters to the plain ASCII a speech engine reads cleanly.
///
/// `None` means keep the character as is; `Some("")` drops it.
fn replacement(c: char) -> Option<&'static str> {
    let r = match c {
        '\u{2018}' | '\u{2019}' | '\u{2032}' => "'",
        '\u{201c}' | '\u{201d}' | '\u{2033}' | '\u{00ab}' | '\u{00bb}' => "\"",
        '\u{2011}'..='\u{2015}' => "-",
        '\u{2026}' => "...",
        '\u{00a0}' | '\u{2009}' | '\u{202f}' => " ",
        '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}' | '\u{00ad}' => "",
        '\u{2039}' => "<",
        '\u{203a}' => ">",
        _ => return None,
    };
    Some(r)
}

/// Clean text for narration.
///
/// - Replaces smart quotes, dashes, ellipses and odd spaces
/// - Removes control characters (except newlines and tabs)
/// - Collapses runs of spaces, and of more than two newlines
/// - Collapses repeated periods, which the chunker treats as sentence ends
pub fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match replacement(c) {
            Some(r) => result.push_str(r),
            None if c == '\n' || c == '\t' || !c.is_control() => result.push(c),
            None => {}
        }
    }

    let result = normalize_whitespace(&result);
    collapse_periods(&result)
}

/// Collapse horizontal whitespace to one space, drop trailing spaces on each
/// line, and allow at most one blank line in a row.
fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut newline_count = 0;

    for c in text.chars() {
        match c {
            '\n' => {
                pending_space = false;
                newline_count += 1;
                if newline_count <= 2 {
                    result.push('\n');
                }
            }
            ' ' | '\t' => pending_space = true,
            _ => {
                if pending_space && !result.is_empty() && !result.ends_with('\n') {
                    result.push(' ');
                }
                pending_space = false;
                newline_count = 0;
                result.push(c);
            }
        }
    }

    result.trim().to_string()
}

fn collapse_periods(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev = None;

    for c in text.chars() {
        if c == '.' && prev == Some('.') {
            continue;
        }
        result.push(c);
        prev = Some(c);
    }

    result
}
