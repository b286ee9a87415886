//! Path template compilation - runs once per operation at registration time.
//!
//! Matching itself is on the request hot path and only allocates the captured values.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::server::ParamVec;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Capture token prefix inside a path template segment.
const CAPTURE_PREFIX: char = ':';

/// Options fixed for every template compiled by one registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathMatchOptions {
    /// Match literal segments regardless of ASCII/Unicode case.
    pub case_insensitive: bool,
    /// Let a single trailing `/` on the request path match.
    pub trailing_slash: bool,
}

/// A path template that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplateError {
    /// Templates are absolute; `pets/:id` is rejected.
    MissingLeadingSlash { template: String },
    /// A bare `:` segment.
    EmptyCaptureName { template: String },
    /// A capture name with characters outside `[A-Za-z0-9_-]`.
    InvalidCaptureName { template: String, name: String },
    /// The generated pattern was rejected by the regex engine.
    Regex { template: String, reason: String },
}

impl fmt::Display for PathTemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTemplateError::MissingLeadingSlash { template } => {
                write!(f, "path template '{template}' must start with '/'")
            }
            PathTemplateError::EmptyCaptureName { template } => {
                write!(f, "path template '{template}' has a capture without a name")
            }
            PathTemplateError::InvalidCaptureName { template, name } => write!(
                f,
                "path template '{template}' has invalid capture name '{name}'"
            ),
            PathTemplateError::Regex { template, reason } => {
                write!(f, "path template '{template}' failed to compile: {reason}")
            }
        }
    }
}

impl std::error::Error for PathTemplateError {}

/// Compiled `:name` path template.
///
/// Each `:name` segment captures exactly one non-empty path segment; every other segment is
/// matched literally. Compilation is deterministic: capture names are kept in template
/// order, duplicates included.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    template: Arc<str>,
    regex: Regex,
    capture_names: Vec<Arc<str>>,
}

impl PathMatcher {
    /// Compile `template` into an anchored regex plus its ordered capture names.
    ///
    /// An empty template is the root path `/`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use restwire::router::{PathMatcher, PathMatchOptions};
    ///
    /// let m = PathMatcher::compile("/path/:a/sub/:b", PathMatchOptions::default()).unwrap();
    /// let captures = m.captures("/path/foo/sub/42").unwrap();
    /// assert_eq!(captures[0].1, "foo");
    /// assert_eq!(captures[1].1, "42");
    /// ```
    pub fn compile(template: &str, options: PathMatchOptions) -> Result<Self, PathTemplateError> {
        let template = if template.is_empty() { "/" } else { template };
        let Some(rest) = template.strip_prefix('/') else {
            return Err(PathTemplateError::MissingLeadingSlash {
                template: template.to_string(),
            });
        };

        let mut pattern = String::with_capacity(template.len() + 16);
        if options.case_insensitive {
            pattern.push_str("(?i)");
        }
        pattern.push('^');
        let mut capture_names = Vec::with_capacity(template.matches(CAPTURE_PREFIX).count());

        for segment in rest.split('/') {
            pattern.push('/');
            match segment.strip_prefix(CAPTURE_PREFIX) {
                Some("") => {
                    return Err(PathTemplateError::EmptyCaptureName {
                        template: template.to_string(),
                    })
                }
                Some(name) => {
                    if !is_valid_capture_name(name) {
                        return Err(PathTemplateError::InvalidCaptureName {
                            template: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    pattern.push_str("([^/]+)");
                    capture_names.push(Arc::from(name));
                }
                None => pattern.push_str(&regex::escape(segment)),
            }
        }

        if options.trailing_slash {
            if pattern.ends_with('/') && !rest.is_empty() {
                pattern.pop();
            }
            if !pattern.ends_with('/') {
                pattern.push_str("/?");
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| PathTemplateError::Regex {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            template: Arc::from(template),
            regex,
            capture_names,
        })
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Capture names in template order.
    #[must_use]
    pub fn capture_names(&self) -> &[Arc<str>] {
        &self.capture_names
    }

    #[must_use]
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Raw (still URL-encoded) segment values keyed by capture name, in template order.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        Some(
            self.capture_names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, value)| {
                    value.map(|v| (Arc::clone(name), v.as_str().to_string()))
                })
                .collect(),
        )
    }
}

fn is_valid_capture_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
