use http::StatusCode;

/// Per-request record of how far any examined operation got.
///
/// Created fresh for every dispatch. Each flag is set once some path-eligible operation
/// passed that stage; the flags drive the fallback status when nothing matched fully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchingResult {
    pub path_matched: bool,
    pub method_matched: bool,
    pub content_type_matched: bool,
    pub accept_matched: bool,
}

impl MatchingResult {
    /// `true` once an operation passed every stage.
    #[must_use]
    pub fn is_full_match(&self) -> bool {
        self.path_matched && self.method_matched && self.content_type_matched && self.accept_matched
    }

    /// Closest reason nothing matched.
    ///
    /// 404 without a path match, 405 without a method match, 415 without a content-type
    /// match, otherwise 406.
    #[must_use]
    pub fn fallback_status(&self) -> StatusCode {
        if !self.path_matched {
            StatusCode::NOT_FOUND
        } else if !self.method_matched {
            StatusCode::METHOD_NOT_ALLOWED
        } else if !self.content_type_matched {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        } else {
            StatusCode::NOT_ACCEPTABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_precedence() {
        let mut result = MatchingResult::default();
        assert_eq!(result.fallback_status(), StatusCode::NOT_FOUND);
        result.path_matched = true;
        assert_eq!(result.fallback_status(), StatusCode::METHOD_NOT_ALLOWED);
        result.method_matched = true;
        assert_eq!(result.fallback_status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        result.content_type_matched = true;
        assert_eq!(result.fallback_status(), StatusCode::NOT_ACCEPTABLE);
        assert!(!result.is_full_match());
        result.accept_matched = true;
        assert!(result.is_full_match());
    }
}
