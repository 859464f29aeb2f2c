//! Parser for the `rpmrc`-style macro file format described in the
//! spec's external interfaces: lines of the form `%NAME BODY` or
//! `%NAME(OPTS) BODY`, with `\`-terminated lines continuing onto the
//! next physical line.

/// One `%NAME BODY` or `%NAME(OPTS) BODY` line from a macro file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcParsedEntry {
    pub name: String,
    pub opts: Option<Vec<u8>>,
    pub body: Vec<u8>,
}

/// Failure parsing a macro rc-file.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RcFileError {
    #[error("line {line}: macro definitions must start with '%'")]
    MissingPercent { line: usize },
    #[error("line {line}: empty macro name")]
    EmptyName { line: usize },
    #[error("line {line}: unterminated '(' in macro options")]
    UnterminatedOpts { line: usize },
}

/// Joins backslash-continued physical lines and strips comment (`#`)
/// and blank lines, then parses each logical line into an
/// [`RcParsedEntry`].
pub fn parse(text: &str) -> Result<Vec<RcParsedEntry>, RcFileError> {
    let mut entries = Vec::new();
    let mut logical = String::new();
    let mut start_line = 1usize;
    let mut current_line = 0usize;

    let mut lines = text.lines().peekable();
    while let Some(raw) = lines.next() {
        current_line += 1;
        if logical.is_empty() {
            start_line = current_line;
        }
        if let Some(stripped) = raw.strip_suffix('\\') {
            logical.push_str(stripped);
            continue;
        }
        logical.push_str(raw);

        let line = std::mem::take(&mut logical);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        entries.push(parse_line(trimmed, start_line)?);
    }
    if !logical.is_empty() {
        entries.push(parse_line(logical.trim(), start_line)?);
    }
    Ok(entries)
}

fn parse_line(line: &str, line_no: usize) -> Result<RcParsedEntry, RcFileError> {
    let rest = line
        .strip_prefix('%')
        .ok_or(RcFileError::MissingPercent { line: line_no })?;
    let bytes = rest.as_bytes();

    let mut i = 0usize;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i == 0 {
        return Err(RcFileError::EmptyName { line: line_no });
    }
    let name = rest[..i].to_string();

    let mut opts = None;
    if bytes.get(i) == Some(&b'(') {
        let close = rest[i + 1..]
            .find(')')
            .ok_or(RcFileError::UnterminatedOpts { line: line_no })?;
        opts = Some(rest[i + 1..i + 1 + close].as_bytes().to_vec());
        i = i + 1 + close + 1;
    }

    let body = rest[i..].trim_start().as_bytes().to_vec();
    Ok(RcParsedEntry { name, opts, body })
}
