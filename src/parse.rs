//! Command-line tokenization: space-separated words, single-quoted arguments,
//! and the trailing `&` background marker.

/// Parse one command line into an argument vector plus a background flag.
///
/// Runs of spaces collapse; a trailing newline is treated as a space. A token
/// beginning with `'` extends to the next `'` and may contain spaces (no
/// escapes, no nesting); an unterminated quote ends the argument list at the
/// line end. If the last token begins with `&` the job is backgrounded and
/// that token is dropped. A blank line yields an empty vector.
pub fn parse_cmdline(line: &str) -> (Vec<String>, bool) {
    let mut rest = line.strip_suffix('\n').unwrap_or(line);
    let mut argv: Vec<String> = Vec::new();

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(quoted) = rest.strip_prefix('\'') {
            match quoted.find('\'') {
                Some(end) => {
                    argv.push(quoted[..end].to_string());
                    rest = &quoted[end + 1..];
                }
                // Unterminated quote: the remainder is discarded.
                None => break,
            }
        } else {
            match rest.find(' ') {
                Some(end) => {
                    argv.push(rest[..end].to_string());
                    rest = &rest[end..];
                }
                None => {
                    argv.push(rest.to_string());
                    break;
                }
            }
        }
    }

    let mut bg = false;
    if argv.last().is_some_and(|tok| tok.starts_with('&')) {
        argv.pop();
        bg = true;
    }
    (argv, bg)
}
