use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use tracing::warn;

/// Delimiters accepted around a pattern, e.g. `/^\d+$/` or `#^p\d+$#i`.
const DELIMITERS: [char; 6] = ['/', '#', '~', '%', '@', '!'];

/// A constraint pattern, kept exactly as configured and compiled on first use.
///
/// The source may be a bare regex (`^\d+$`) or a delimited one with trailing
/// flags (`/^[a-z]+$/i`). Flags `i`, `m`, `s`, `x` and `U` become inline
/// regex flags and `D` is accepted with no effect. A delimited pattern treats
/// `\d` as ASCII `[0-9]` unless the `u` flag is given; a bare pattern keeps
/// the Unicode-aware `\d` of the `regex` crate.
///
/// A source that starts with a delimiter (`/ # ~ % @ !`) and whose text after
/// the last occurrence of that delimiter is empty or only flag letters is
/// always read as delimited: `/api/sim` is the body `api` with flags `sim`.
/// To match such text literally, wrap it in a different delimiter
/// (`#^/api/sim$#`) or start it with an anchor (`^/api/sim`).
///
/// Compilation is deferred so that configuring a route never fails; an
/// invalid pattern is reported by [`Pattern::is_match`] every time it is
/// evaluated.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    compiled: OnceCell<Regex>,
}

impl Pattern {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceCell::new(),
        }
    }

    /// The pattern as configured, delimiters and flags included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Test `value` against the pattern, compiling it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn is_match(&self, value: &str) -> Result<bool> {
        let regex = self.compiled.get_or_try_init(|| {
            let translated = translate(&self.source);
            Regex::new(&translated)
                .inspect_err(|e| {
                    warn!(pattern = %self.source, error = %e, "Constraint pattern failed to compile");
                })
                .with_context(|| format!("invalid constraint pattern {:?}", self.source))
        })?;
        Ok(regex.is_match(value))
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// Convert a possibly delimited source into regex-crate syntax.
pub(crate) fn translate(source: &str) -> String {
    match split_delimited(source) {
        Some((body, flags)) => {
            let body = if flags.contains('u') {
                Cow::Borrowed(body)
            } else {
                ascii_digits(body)
            };
            let inline: String = flags
                .chars()
                .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'U'))
                .collect();
            if inline.is_empty() {
                body.into_owned()
            } else {
                format!("(?{inline}){body}")
            }
        }
        None => source.to_string(),
    }
}

/// Rewrite every unescaped `\d` as an ASCII digit range.
fn ascii_digits(body: &str) -> Cow<'_, str> {
    if !body.contains(r"\d") {
        return Cow::Borrowed(body);
    }
    let mut out = String::with_capacity(body.len() + 8);
    let mut in_class = false;
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('d') if in_class => out.push_str("0-9"),
                Some('d') => out.push_str("[0-9]"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Split `/body/flags` into `(body, flags)`; `None` for a bare pattern.
fn split_delimited(source: &str) -> Option<(&str, &str)> {
    let delim = source.chars().next().filter(|c| DELIMITERS.contains(c))?;
    let close = source.rfind(delim).filter(|&i| i > 0)?;
    let flags = &source[close + 1..];
    if !flags
        .chars()
        .all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u' | 'U' | 'D'))
    {
        return None;
    }
    Some((&source[delim.len_utf8()..close], flags))
}
