//! Text shaping for the 16 column panel
//!
//! File names from the print server are usually far wider than the panel.
//! [`shorten_name`] compacts them in stages, stopping as soon as the name
//! fits.

/// Upper-case the first character and lower-case the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn fits(text: &str, width: usize) -> bool {
    text.chars().count() <= width
}

/// Upper-case `v` version markers (`v2` becomes `V2`)
fn capitalize_versions(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let before_digit = chars.get(i + 1).is_some_and(char::is_ascii_digit);
            if c == 'v' && before_digit {
                'V'
            } else {
                c
            }
        })
        .collect()
}

/// Split at upper-case letters, `-`, `_` and spaces
///
/// A word starts at an ASCII letter or digit and runs until the next
/// separator or upper-case letter. Anything else between words is dropped.
fn split_separated(name: &str) -> Vec<String> {
    let is_break = |c: char| c.is_uppercase() || matches!(c, '-' | '_' | ' ');

    let mut words = Vec::new();
    let mut current: Option<String> = None;
    for c in name.chars() {
        match current.as_mut() {
            Some(word) if !is_break(c) => word.push(c),
            _ => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
                if c.is_ascii_alphanumeric() {
                    current = Some(c.to_string());
                }
            }
        }
    }
    words.extend(current);
    words
}

/// Split at upper-case letters and digits that start a word
///
/// Each word starts at a digit or upper-case letter and runs until the next
/// upper-case letter. Leading lower-case text is not part of any word.
fn split_capitalized(name: &str) -> Vec<String> {
    let starts = |c: char| c.is_ascii_digit() || c.is_ascii_uppercase();

    let mut words = Vec::new();
    let mut current: Option<String> = None;
    for c in name.chars() {
        match current.as_mut() {
            Some(word) if !c.is_ascii_uppercase() => word.push(c),
            _ => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
                if starts(c) {
                    current = Some(c.to_string());
                }
            }
        }
    }
    words.extend(current);
    words
}

/// Runs of ASCII digits, in order of appearance
fn digit_runs(name: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(core::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// `V` followed by a digit somewhere in the word
fn is_version_word(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars
        .windows(2)
        .any(|pair| pair[0] == 'V' && pair[1].is_ascii_digit())
}

/// Compact a file name to at most `width` characters where possible
///
/// Stages, each applied only while the name is still too wide:
///
/// 1. Drop the extension (everything from the first `.`)
/// 2. Remove `-`, `_` and spaces, capitalizing each word
/// 3. Remove numbers longer than two digits
/// 4. Remove words from the end, keeping version words such as `V2`
///
/// The result can still exceed `width` when nothing else can be dropped;
/// the display truncates it.
pub fn shorten_name(name: &str, width: usize) -> String {
    if fits(name, width) {
        return name.to_string();
    }

    let mut name = match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name.to_string(),
    };
    if fits(&name, width) {
        return name;
    }

    name = split_separated(&capitalize_versions(&name))
        .iter()
        .map(|w| capitalize(w))
        .collect();
    if fits(&name, width) {
        return name;
    }

    for run in digit_runs(&name) {
        if run.len() > 2 && !fits(&name, width) {
            name = name.replace(&run, "");
        }
    }
    if fits(&name, width) {
        return name;
    }

    for word in split_capitalized(&name).iter().rev() {
        if fits(&name, width) {
            break;
        }
        if !is_version_word(word) {
            name = name.replace(word.as_str(), "");
        }
    }
    name
}

/// `"{label}: {h} h,{m} m"` with whole hours and minutes
pub fn format_hours_minutes(label: &str, seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    format!("{}: {} h,{} m", label, hours, minutes)
}

/// `"{event} {m}:{s}"` for a finished slicing job
///
/// Spaces are squeezed out when the text does not fit the panel.
pub fn format_slicing_done(event: &str, seconds: f64, width: usize) -> String {
    let seconds = seconds.max(0.0).floor() as u64;
    let text = format!("{} {}:{}", event, seconds / 60, seconds % 60);
    if fits(&text, width) {
        text
    } else {
        text.replace(' ', "")
    }
}
