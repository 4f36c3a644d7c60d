/// Returns the value of the `key` parameter in a `Content-Disposition` value.
///
/// Parameter names match case-insensitively. Quoted values are returned
/// without their quotes and without escape processing, so Windows paths keep
/// their backslashes. Empty values count as absent.
pub fn disposition_param<'a>(value: &'a str, key: &str) -> Option<&'a str> {
    split_semicolon_aware(value)
        .skip(1)
        .filter_map(|segment| segment.split_once('='))
        .find(|(raw_key, _)| raw_key.trim().eq_ignore_ascii_case(key))
        .map(|(_, raw_value)| unquote(raw_value.trim()))
        .filter(|value| !value.is_empty())
}

/// Strips any client-side directory from an uploaded file name.
///
/// Browsers on Windows used to send the full local path, so everything up to
/// the last backslash is dropped.
pub fn strip_windows_path(filename: &str) -> &str {
    filename
        .rfind('\\')
        .map_or(filename, |at| &filename[at + 1..])
}

fn unquote(raw: &str) -> &str {
    let Some(quoted) = raw.strip_prefix('"') else {
        return raw;
    };

    quoted.find('"').map_or(quoted, |end| &quoted[..end])
}

/// Splits on `;` outside of double quotes.
fn split_semicolon_aware(value: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(value);

    std::iter::from_fn(move || {
        let current = rest?;
        let mut in_quotes = false;

        for (at, ch) in current.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                ';' if !in_quotes => {
                    rest = Some(&current[at + 1..]);
                    return Some(&current[..at]);
                }
                _ => {}
            }
        }

        rest = None;
        Some(current)
    })
}
