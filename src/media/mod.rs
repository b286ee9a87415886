//! # Media Type Negotiation
//!
//! Parsing of Accept/Content-Type style header values and selection of media types
//! against an operation's consumed or produced set.
//!
//! Two questions are answered here:
//!
//! - **Is this request acceptable?** [`supports_requested_media_types`] returns `true` when
//!   any requested entry matches the supported set exactly, or, for entries containing `*`,
//!   when some supported type matches the wildcard pattern.
//! - **What do we respond with?** [`get_requested_media_type`] orders entries by quality
//!   (stable, so ties keep header order), takes the best one and resolves wildcards to the
//!   first supported type they match.
//!
//! A missing header and an empty set are both permissive.
//!
//! ```rust
//! use restwire::media::{get_requested_media_type, MediaTypeSet};
//!
//! let produced: MediaTypeSet = ["application/json", "application/xml"].into_iter().collect();
//! let chosen = get_requested_media_type(
//!     Some("application/json;q=0.2, application/xml"),
//!     Some(&produced),
//! );
//! assert_eq!(chosen.as_deref(), Some("application/xml"));
//! ```

mod core;

pub use self::core::{
    by_preference, essence, get_requested_media_type, parse_media_types,
    supports_requested_media_types, wildcard_regex, MediaTypeSet, ParsedMediaType,
    DEFAULT_MEDIA_TYPE, DEFAULT_REQUESTED_MEDIA_TYPE, FORM_MEDIA_TYPE,
};
