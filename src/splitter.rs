//! Decomposes a single URL into a flat record of named components.
//!
//! Grammar validation is delegated to [`url::Url`]. Components are cut from
//! the text itself, so paths keep their original encoding and explicit
//! default ports survive.

use percent_encoding::percent_decode_str;
use url::{Url, form_urlencoded};

use crate::error::{AnalyzerError, Result};

/// Separator placed between repeated values of one query parameter.
pub const QUERY_VALUE_SEPARATOR: &str = "@@";

/// One decomposed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// The input exactly as supplied.
    pub source: String,
    /// The string that was parsed (percent-decoded when decoding is on).
    pub url: String,
    pub scheme: String,
    /// Raw authority, including userinfo and port.
    pub netloc: String,
    /// Lower-cased hostname, only when it differs from `netloc`.
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub query: String,
    pub fragment: String,
    /// `(name, values joined with "@@")` in order of first appearance.
    pub query_params: Vec<(String, String)>,
    /// Non-empty path segments, outermost first.
    pub segments: Vec<String>,
}

impl UrlRecord {
    /// Deepest non-empty segment.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

/// Splits `input` into its components, percent-decoding it first when
/// `decode` is set.
///
/// # Errors
///
/// Returns [`AnalyzerError::Parse`] when the string is not an absolute URL.
pub fn split(input: &str, decode: bool) -> Result<UrlRecord> {
    let url = if decode {
        percent_decode_str(input).decode_utf8_lossy().into_owned()
    } else {
        input.to_string()
    };

    let parsed = Url::parse(url.trim()).map_err(|e| AnalyzerError::parse(input, e))?;
    let raw = RawParts::cut(url.trim());

    let (hostname, port) = split_authority(raw.netloc);
    // Port 0 is treated as absent.
    let port = match port {
        Some(p) if !p.is_empty() => Some(
            p.parse::<u16>()
                .map_err(|e| AnalyzerError::parse(input, format!("invalid port '{p}': {e}")))?,
        )
        .filter(|&p| p != 0),
        _ => None,
    };
    let host = Some(hostname.to_lowercase()).filter(|h| !h.is_empty() && h != raw.netloc);

    let segments = raw
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Ok(UrlRecord {
        source: input.to_string(),
        scheme: parsed.scheme().to_string(),
        netloc: raw.netloc.to_string(),
        host,
        port,
        path: raw.path.to_string(),
        query: raw.query.to_string(),
        fragment: raw.fragment.to_string(),
        query_params: parse_query(raw.query),
        segments,
        url,
    })
}

/// Borrowed slices of the generic URL grammar.
struct RawParts<'a> {
    netloc: &'a str,
    path: &'a str,
    query: &'a str,
    fragment: &'a str,
}

impl<'a> RawParts<'a> {
    fn cut(s: &'a str) -> Self {
        let (rest, fragment) = s.split_once('#').unwrap_or((s, ""));
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        // Only called after Url::parse succeeded, so a scheme is present.
        let rest = rest.split_once(':').map_or(rest, |(_, r)| r);

        let (netloc, path) = match rest.strip_prefix("//") {
            Some(after) => match after.find('/') {
                Some(idx) => after.split_at(idx),
                None => (after, ""),
            },
            None => ("", rest),
        };

        Self {
            netloc,
            path,
            query,
            fragment,
        }
    }
}

/// Splits an authority into hostname and the raw port text, if any.
fn split_authority(netloc: &str) -> (&str, Option<&str>) {
    let hostport = netloc.rsplit_once('@').map_or(netloc, |(_, h)| h);

    if let Some(bracketed) = hostport.strip_prefix('[') {
        return match bracketed.split_once(']') {
            Some((host, rest)) => (host, rest.strip_prefix(':')),
            None => (bracketed, None),
        };
    }

    match hostport.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (hostport, None),
    }
}

/// Parses a query string into `query_<name>` columns. Pairs without a value
/// are dropped.
fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();

    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value.into_owned()),
            None => grouped.push((name.into_owned(), vec![value.into_owned()])),
        }
    }

    grouped
        .into_iter()
        .map(|(name, values)| {
            (
                format!("query_{name}"),
                values.join(QUERY_VALUE_SEPARATOR),
            )
        })
        .collect()
}
