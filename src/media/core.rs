use regex::Regex;
use std::cmp::Ordering;
use tracing::debug;

/// Fallback response media type when nothing else can be decided.
pub const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Media type assumed for an entry that carries only extension parameters.
pub const DEFAULT_REQUESTED_MEDIA_TYPE: &str = "*/*";

/// Form-encoded payload media type.
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

const QUALITY_EXTENSION: &str = "q";
const DEFAULT_QUALITY: f32 = 1.0;

/// Insertion-ordered, duplicate-free set of media type strings.
///
/// Iteration order is declaration order; wildcard resolution and default selection
/// both depend on it. An empty set means "any media type".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaTypeSet(Vec<String>);

impl MediaTypeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a media type, ignoring duplicates. Returns `true` if it was new.
    pub fn insert(&mut self, media_type: impl Into<String>) -> bool {
        let media_type = media_type.into();
        if self.contains(&media_type) {
            return false;
        }
        self.0.push(media_type);
        true
    }

    #[must_use]
    pub fn contains(&self, media_type: &str) -> bool {
        self.0.iter().any(|m| m == media_type)
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// `None` when the set is empty, so callers can treat "empty" and "absent" alike.
    #[must_use]
    pub fn as_declared(&self) -> Option<&Self> {
        (!self.is_empty()).then_some(self)
    }
}

impl<S: Into<String>> FromIterator<S> for MediaTypeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for media_type in iter {
            set.insert(media_type);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for MediaTypeSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for media_type in iter {
            self.insert(media_type);
        }
    }
}

/// One entry of an Accept-style header.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMediaType {
    pub media_type: String,
    pub quality: f32,
}

impl ParsedMediaType {
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        is_wildcard(&self.media_type)
    }
}

#[inline]
fn is_wildcard(media_type: &str) -> bool {
    media_type.contains('*')
}

/// Parse a comma-separated Accept/Content-Type style header value.
///
/// Each entry is `type/subtype` followed by optional `;name=value` extensions; only `q`
/// is interpreted. An unparseable quality keeps the default of `1.0`. Blank entries are
/// skipped.
#[must_use]
pub fn parse_media_types(header_value: &str) -> Vec<ParsedMediaType> {
    header_value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_media_type)
        .collect()
}

fn parse_media_type(entry: &str) -> ParsedMediaType {
    let mut parsed = ParsedMediaType {
        media_type: DEFAULT_REQUESTED_MEDIA_TYPE.to_string(),
        quality: DEFAULT_QUALITY,
    };

    for part in entry.split(';').map(str::trim) {
        match part.split_once('=') {
            Some((name, value)) if !name.is_empty() && !value.is_empty() => {
                if name.trim() == QUALITY_EXTENSION {
                    if let Ok(quality) = value.trim().parse::<f32>() {
                        if quality.is_finite() {
                            parsed.quality = quality;
                        }
                    }
                }
            }
            _ => parsed.media_type = part.to_string(),
        }
    }

    parsed
}

/// Compile a wildcard media type (`application/*`) into an anchored regex.
///
/// Every regex metacharacter is escaped, then each `*` becomes `.*`.
#[must_use]
pub fn wildcard_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{escaped}$")).ok()
}

/// Treat a blank header the same as a missing one.
fn present(header_value: Option<&str>) -> Option<&str> {
    header_value.filter(|h| !h.trim().is_empty())
}

fn matches_supported(requested: &str, supported: &MediaTypeSet) -> bool {
    if !is_wildcard(requested) {
        return supported.contains(requested);
    }
    wildcard_regex(requested).is_some_and(|re| supported.iter().any(|m| re.is_match(m)))
}

fn first_matching_wildcard<'a>(requested: &str, supported: &'a MediaTypeSet) -> Option<&'a str> {
    let re = wildcard_regex(requested)?;
    supported.iter().find(|m| re.is_match(m))
}

/// Test whether any requested media type is supported.
///
/// A missing header or an empty supported set is always supported.
#[must_use]
pub fn supports_requested_media_types(
    header_value: Option<&str>,
    supported: Option<&MediaTypeSet>,
) -> bool {
    let (Some(header_value), Some(supported)) =
        (present(header_value), supported.and_then(MediaTypeSet::as_declared))
    else {
        return true;
    };

    parse_media_types(header_value)
        .iter()
        .any(|parsed| matches_supported(&parsed.media_type, supported))
}

/// Requested entries ordered by descending quality; ties keep header order.
#[must_use]
pub fn by_preference(header_value: &str) -> Vec<ParsedMediaType> {
    let mut parsed = parse_media_types(header_value);
    parsed.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    parsed
}

fn most_requested(header_value: &str) -> Option<ParsedMediaType> {
    by_preference(header_value).into_iter().next()
}

/// Select the single media type to respond with.
///
/// With both an Accept header and a declared supported set, the highest-quality entry wins
/// and a wildcard entry resolves to the first supported type it matches; `None` means the
/// wildcard matched nothing. Otherwise the first supported type, then the most requested
/// concrete entry, then [`DEFAULT_MEDIA_TYPE`] is used.
#[must_use]
pub fn get_requested_media_type(
    header_value: Option<&str>,
    supported: Option<&MediaTypeSet>,
) -> Option<String> {
    let header_value = present(header_value);
    let supported = supported.and_then(MediaTypeSet::as_declared);

    let selected = match (header_value, supported) {
        (Some(header_value), Some(supported)) => {
            let preferred = most_requested(header_value)?;
            if preferred.is_wildcard() {
                first_matching_wildcard(&preferred.media_type, supported).map(str::to_string)
            } else {
                Some(preferred.media_type)
            }
        }
        (_, Some(supported)) => supported.first().map(str::to_string),
        (Some(header_value), None) => Some(
            most_requested(header_value)
                .filter(|preferred| !preferred.is_wildcard())
                .map_or_else(|| DEFAULT_MEDIA_TYPE.to_string(), |preferred| preferred.media_type),
        ),
        (None, None) => Some(DEFAULT_MEDIA_TYPE.to_string()),
    };

    debug!(
        accept = ?header_value,
        supported = ?supported.map(|s| s.iter().collect::<Vec<_>>()),
        selected = ?selected,
        "Response media type negotiated"
    );

    selected
}

/// Bare `type/subtype` of a Content-Type value, parameters removed, lowercased.
#[must_use]
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
