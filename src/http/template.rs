//! URL template expansion and query string encoding

use std::collections::HashMap;
use std::ops::Range;
use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::error::{FluentReqError, Result};

/// Characters left intact when a placeholder value is substituted into a URL.
/// Reserved URL delimiters survive so a value may carry a sub-path.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters left intact in a query component.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme pattern"))
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{([A-Za-z0-9_-]+)\}?|:([A-Za-z0-9_-]+)").expect("valid placeholder pattern")
    })
}

/// Percent-encode a value substituted into the path of a URL.
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI_ENCODE_SET).to_string()
}

/// Percent-encode a single query key or value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_ENCODE_SET).to_string()
}

/// Replace every `{name}` and `:name` placeholder in `template`.
///
/// The whole template is scanned, host included. Only the port of a leading
/// `scheme://authority` and a bracketed IPv6 host are left literal, so
/// `https://{tenant}.example.com:8080` expands `tenant` but not `8080`. A
/// closing brace after a `{name` placeholder is consumed with it.
pub fn expand(template: &str, params: &HashMap<String, String>) -> Result<String> {
    let literal = literal_spans(template);

    let mut expanded = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder_pattern().captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
            continue;
        };
        if literal.iter().any(|span| span.contains(&whole.start())) {
            continue;
        }
        let value = params.get(name.as_str()).ok_or_else(|| {
            FluentReqError::MissingUrlParameter {
                name: name.as_str().to_string(),
                template: template.to_string(),
            }
        })?;
        expanded.push_str(&template[last..whole.start()]);
        expanded.push_str(&encode_uri(value));
        last = whole.end();
    }
    expanded.push_str(&template[last..]);

    Ok(expanded)
}

/// Append `params` as a query string, starting with `?` or `&` as needed.
///
/// Repeated calls accumulate; nothing is deduplicated.
pub fn append_query<I, K, V>(url: &mut String, params: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    url.push(if url.contains('?') { '&' } else { '?' });
    let pairs: Vec<String> = params
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key.as_ref()),
                encode_component(value.as_ref())
            )
        })
        .collect();
    url.push_str(&pairs.join("&"));
}

/// Byte ranges of the authority that are never placeholders: a bracketed
/// IPv6 host and a numeric `:port`. Only a scheme at the very start of the
/// template opens an authority.
fn literal_spans(template: &str) -> Vec<Range<usize>> {
    let Some(scheme) = scheme_pattern().find(template) else {
        return Vec::new();
    };
    let start = scheme.end();
    let end = template[start..]
        .find(['/', '?', '#'])
        .map(|offset| start + offset)
        .unwrap_or(template.len());
    let authority = &template[start..end];
    let host_start = start + authority.rfind('@').map(|at| at + 1).unwrap_or(0);
    let host = &template[host_start..end];

    let mut spans = Vec::new();
    let mut after_host = 0;
    if host.starts_with('[') {
        if let Some(close) = host.find(']') {
            spans.push(host_start..host_start + close + 1);
            after_host = close + 1;
        }
    }
    if let Some(colon) = host[after_host..].rfind(':') {
        let colon = after_host + colon;
        let port = &host[colon + 1..];
        if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
            spans.push(host_start + colon..end);
        }
    }
    spans
}
