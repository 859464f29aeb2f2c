//! Named text-macro store and expansion.
//!
//! Ports the macro engine described by `build/macro.c` in the original
//! sources: a sorted name→body table (here a `BTreeMap`, which already
//! gives the "sorted, O(log n) lookup" contract the original hand-rolled
//! with a binary-searched array) and a single-pass, left-to-right
//! expansion loop over a byte buffer.
//!
//! Expansion is deliberately *not* recursive into substituted text — a
//! macro body containing `%foo` is only resolved if the body itself was
//! expanded when the macro was defined, or the caller re-invokes
//! [`MacroContext::expand`]. This mirrors the original's behavior
//! exactly and is a frequent source of confusion for new users of real
//! rpm, which is why it's called out here rather than silently "fixed".

mod rcfile;

use std::collections::BTreeMap;

pub use rcfile::{RcFileError, RcParsedEntry};

/// Definition-nesting levels used by [`MacroContext::remove_level`].
///
/// Lower values are broader in scope and are loaded first; later levels
/// shadow earlier ones on lookup and are unwound independently (e.g. a
/// per-script scope is dropped with `remove_level(PER_SCRIPT)` without
/// disturbing spec-file-level definitions).
pub mod level {
    pub const BUILTIN: i32 = 0;
    pub const RC_FILE: i32 = 10;
    pub const COMMAND_LINE: i32 = 20;
    pub const SPEC_FILE: i32 = 30;
    pub const PER_SCRIPT: i32 = 40;
}

/// The default cap on expanded-buffer size before
/// [`MacroError::ExpansionTooLarge`] is raised.
pub const DEFAULT_MAX_EXPANSION: usize = 8 * 1024 * 1024;

/// A single named macro definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub body: Vec<u8>,
    pub opts: Option<Vec<u8>>,
    pub level: i32,
}

/// Failures raised while defining or expanding macros.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MacroError {
    #[error("bad spec: {0}")]
    BadSpec(String),
    #[error("macro expansion too large (limit {limit} bytes)")]
    ExpansionTooLarge { limit: usize },
}

/// An ordered collection of [`Macro`] definitions, unique by name.
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
    macros: BTreeMap<String, Macro>,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// Returns `true` if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(&b) if is_ident_start(b) => bytes[1..].iter().all(|&b| is_name_byte(b)),
        _ => false,
    }
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn first_token(bytes: &[u8]) -> &[u8] {
    let trimmed = trim_ascii_whitespace(bytes);
    match trimmed.iter().position(|b| b.is_ascii_whitespace()) {
        Some(i) => &trimmed[..i],
        None => trimmed,
    }
}

impl MacroContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the macro named `name`. The latest definition
    /// wins regardless of prior level.
    pub fn define(&mut self, name: &str, body: &[u8], level: i32) {
        self.define_with_opts(name, body, None, level);
    }

    /// As [`MacroContext::define`], additionally recording the
    /// parenthesized option text from a `%NAME(OPTS) BODY` rc-file line.
    pub fn define_with_opts(&mut self, name: &str, body: &[u8], opts: Option<&[u8]>, level: i32) {
        self.macros.insert(
            name.to_string(),
            Macro {
                name: name.to_string(),
                body: body.to_vec(),
                opts: opts.map(|o| o.to_vec()),
                level,
            },
        );
    }

    /// Removes the macro named `name`. No-op if absent.
    pub fn undefine(&mut self, name: &str) {
        self.macros.remove(name);
    }

    /// Drops every macro whose `level >= threshold`.
    pub fn remove_level(&mut self, threshold: i32) {
        self.macros.retain(|_, m| m.level < threshold);
    }

    /// Looks up a macro by name.
    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    /// Returns `true` if a macro named `name` exists.
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Iterates definitions in name-sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }

    /// Expands `buf` in place at [`level::SPEC_FILE`], with the default
    /// size cap.
    pub fn expand(&mut self, buf: &mut Vec<u8>) -> Result<(), MacroError> {
        self.expand_at(buf, level::SPEC_FILE)
    }

    /// Expands `buf` in place. Any `%define` directive found is recorded
    /// at `level`.
    pub fn expand_at(&mut self, buf: &mut Vec<u8>, level: i32) -> Result<(), MacroError> {
        self.expand_with_limit(buf, level, DEFAULT_MAX_EXPANSION)
    }

    /// As [`MacroContext::expand_at`], with an explicit output-size cap.
    pub fn expand_with_limit(
        &mut self,
        buf: &mut Vec<u8>,
        level: i32,
        limit: usize,
    ) -> Result<(), MacroError> {
        let input = std::mem::take(buf);
        let mut out = Vec::with_capacity(input.len());
        let mut pos = 0usize;

        while pos < input.len() {
            if input[pos] != b'%' {
                out.push(input[pos]);
                pos += 1;
                check_limit(&out, limit)?;
                continue;
            }

            // `%` with nothing after it, or followed by whitespace/NUL,
            // is an illegal reference (empty macro name).
            if pos + 1 >= input.len() || input[pos + 1].is_ascii_whitespace() {
                return Err(MacroError::BadSpec("Illegal %% syntax".to_string()));
            }

            let next = input[pos + 1];

            if next == b'%' {
                out.push(b'%');
                pos += 2;
                check_limit(&out, limit)?;
                continue;
            }

            if next == b'{' {
                let close_rel = input[pos + 2..].iter().position(|&b| b == b'}');
                let Some(close_rel) = close_rel else {
                    return Err(MacroError::BadSpec("Unterminated {".to_string()));
                };
                let close = pos + 2 + close_rel;
                let inner = &input[pos + 2..close];
                let name_bytes = first_token(inner);
                if name_bytes.is_empty() {
                    return Err(MacroError::BadSpec("Illegal %% syntax".to_string()));
                }
                let name = std::str::from_utf8(name_bytes)
                    .map_err(|_| MacroError::BadSpec("Illegal %% syntax".to_string()))?;
                match self.macros.get(name) {
                    Some(m) => out.extend_from_slice(&m.body),
                    None => out.extend_from_slice(&input[pos..=close]),
                }
                pos = close + 1;
                check_limit(&out, limit)?;
                continue;
            }

            if !is_name_byte(next) {
                return Err(MacroError::BadSpec("Illegal %% syntax".to_string()));
            }

            let mut end = pos + 1;
            while end < input.len() && is_name_byte(input[end]) {
                end += 1;
            }
            let name_bytes = &input[pos + 1..end];
            let name = std::str::from_utf8(name_bytes)
                .map_err(|_| MacroError::BadSpec("Illegal %% syntax".to_string()))?;

            if pos == 0 && name == "define" {
                let rest = &input[end..];
                self.handle_define(rest, level)?;
                buf.clear();
                return Ok(());
            }

            match self.macros.get(name) {
                Some(m) => out.extend_from_slice(&m.body),
                None => out.extend_from_slice(&input[pos..end]),
            }
            pos = end;
            check_limit(&out, limit)?;
        }

        *buf = out;
        Ok(())
    }

    /// Handles a `%define` directive: `NAME BODY...` with trailing
    /// whitespace on BODY stripped and BODY recursively expanded before
    /// the macro is installed.
    fn handle_define(&mut self, rest: &[u8], level: i32) -> Result<(), MacroError> {
        let mut i = 0usize;
        while i < rest.len() && rest[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_start = i;
        while i < rest.len() && !rest[i].is_ascii_whitespace() {
            i += 1;
        }
        if name_start == i {
            return Err(MacroError::BadSpec("Unfinished %define".to_string()));
        }
        let name = std::str::from_utf8(&rest[name_start..i])
            .map_err(|_| MacroError::BadSpec("Unfinished %define".to_string()))?
            .to_string();
        if !is_valid_identifier(&name) {
            return Err(MacroError::BadSpec(format!("Illegal macro name: {name}")));
        }

        while i < rest.len() && rest[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut body = rest[i..].to_vec();
        while matches!(body.last(), Some(b) if b.is_ascii_whitespace()) {
            body.pop();
        }

        self.expand_at(&mut body, level)?;
        self.define(&name, &body, level);
        Ok(())
    }

    /// Loads macro definitions from rc-file text (see [`rcfile`]).
    pub fn load_rc_text(&mut self, text: &str, level: i32) -> Result<(), RcFileError> {
        for entry in rcfile::parse(text)? {
            self.define_with_opts(&entry.name, &entry.body, entry.opts.as_deref(), level);
        }
        Ok(())
    }
}

fn check_limit(out: &[u8], limit: usize) -> Result<(), MacroError> {
    if out.len() > limit {
        Err(MacroError::ExpansionTooLarge { limit })
    } else {
        Ok(())
    }
}
