use crate::binder::BindError;
use crate::handler::HandlerRef;
use crate::media::MediaTypeSet;
use crate::router::{PathMatchOptions, PathMatcher};
use http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Body,
    Context,
    Cookie,
    Form,
    Header,
    Matrix,
    Path,
    Query,
}

impl ParameterKind {
    /// Kinds whose descriptor carries a [`ParameterName::NamedKey`].
    #[must_use]
    pub fn is_named(self) -> bool {
        !matches!(self, ParameterKind::Body | ParameterKind::Context)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterKind::Body => "Body",
            ParameterKind::Context => "Context",
            ParameterKind::Cookie => "Cookie",
            ParameterKind::Form => "Form",
            ParameterKind::Header => "Header",
            ParameterKind::Matrix => "Matrix",
            ParameterKind::Path => "Path",
            ParameterKind::Query => "Query",
        };
        write!(f, "{s}")
    }
}

/// Semantic target type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    String,
    Number,
    Boolean,
    /// Opaque complex type tag, bound from a JSON payload.
    Complex(String),
}

impl DeclaredType {
    /// `string`, `number` and `boolean` (any case) are primitives; any other tag is complex.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "string" => DeclaredType::String,
            "number" => DeclaredType::Number,
            "boolean" => DeclaredType::Boolean,
            _ => DeclaredType::Complex(tag.to_string()),
        }
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DeclaredType::Complex(_))
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::String => write!(f, "String"),
            DeclaredType::Number => write!(f, "Number"),
            DeclaredType::Boolean => write!(f, "Boolean"),
            DeclaredType::Complex(tag) => write!(f, "{tag}"),
        }
    }
}

/// Identifier of a context type a handler may ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextTypeRef(Arc<str>);

impl ContextTypeRef {
    /// The in-flight [`Request`](crate::server::Request).
    pub const REQUEST: &'static str = "Request";

    #[must_use]
    pub fn new(identifier: &str) -> Self {
        Self(Arc::from(identifier))
    }

    #[must_use]
    pub fn request() -> Self {
        Self::new(Self::REQUEST)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a parameter's name refers to; which variant applies is decided by its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterName {
    /// Header, cookie, path segment, query, matrix or form key.
    NamedKey(String),
    /// Which context value a `Context` parameter receives.
    ContextTypeRef(ContextTypeRef),
}

/// One positional handler argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    pub kind: ParameterKind,
    pub declared_type: DeclaredType,
    pub name: Option<ParameterName>,
}

impl ParameterDescriptor {
    /// A parameter read from a named request part (`Path`, `Query`, `Header`, ...).
    #[must_use]
    pub fn named(kind: ParameterKind, name: &str, declared_type: DeclaredType) -> Self {
        Self {
            kind,
            declared_type,
            name: Some(ParameterName::NamedKey(name.to_string())),
        }
    }

    #[must_use]
    pub fn path(name: &str, declared_type: DeclaredType) -> Self {
        Self::named(ParameterKind::Path, name, declared_type)
    }

    #[must_use]
    pub fn query(name: &str, declared_type: DeclaredType) -> Self {
        Self::named(ParameterKind::Query, name, declared_type)
    }

    #[must_use]
    pub fn header(name: &str, declared_type: DeclaredType) -> Self {
        Self::named(ParameterKind::Header, name, declared_type)
    }

    #[must_use]
    pub fn cookie(name: &str, declared_type: DeclaredType) -> Self {
        Self::named(ParameterKind::Cookie, name, declared_type)
    }

    #[must_use]
    pub fn form(name: &str, declared_type: DeclaredType) -> Self {
        Self::named(ParameterKind::Form, name, declared_type)
    }

    #[must_use]
    pub fn matrix(name: &str, declared_type: DeclaredType) -> Self {
        Self::named(ParameterKind::Matrix, name, declared_type)
    }

    /// Whole-payload parameter.
    #[must_use]
    pub fn body(declared_type: DeclaredType) -> Self {
        Self {
            kind: ParameterKind::Body,
            declared_type,
            name: None,
        }
    }

    #[must_use]
    pub fn context(context_type: ContextTypeRef) -> Self {
        Self {
            kind: ParameterKind::Context,
            declared_type: DeclaredType::Complex(context_type.as_str().to_string()),
            name: Some(ParameterName::ContextTypeRef(context_type)),
        }
    }

    /// The named key, when this parameter's name is one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match &self.name {
            Some(ParameterName::NamedKey(key)) => Some(key),
            _ => None,
        }
    }

    /// Check that kind, declared type and name variant fit together.
    pub fn validate(&self) -> Result<(), BindError> {
        match self.kind {
            ParameterKind::Context => match &self.name {
                Some(ParameterName::ContextTypeRef(_)) => Ok(()),
                _ => Err(BindError::MissingContextType),
            },
            ParameterKind::Body => Ok(()),
            kind => {
                if !self.declared_type.is_primitive() {
                    return Err(BindError::ComplexNonPayload {
                        kind,
                        declared_type: self.declared_type.to_string(),
                    });
                }
                match &self.name {
                    Some(ParameterName::NamedKey(key)) if !key.is_empty() => Ok(()),
                    _ => Err(BindError::MissingName { kind }),
                }
            }
        }
    }
}

/// Immutable routing facts of one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    /// Path template with `:name` segment captures, enclosing prefix already applied.
    pub resource_path: String,
    /// Accepted methods; empty means the operation is never dispatched.
    pub http_methods: Vec<Method>,
    /// Accepted request media types; empty means any.
    pub consumed_media_types: MediaTypeSet,
    /// Producible response media types; empty means any.
    pub produced_media_types: MediaTypeSet,
    /// Positional handler arguments.
    pub parameters: Vec<ParameterDescriptor>,
    pub handler: HandlerRef,
}

impl OperationDescriptor {
    #[must_use]
    pub fn allows_method(&self, method: &Method) -> bool {
        self.http_methods.contains(method)
    }

    /// Problems visible without compiling the path template: illegal parameters and an
    /// empty method list.
    #[must_use]
    pub fn declaration_issues(&self) -> Vec<DescriptorIssue> {
        let mut issues: Vec<DescriptorIssue> = self
            .parameters
            .iter()
            .enumerate()
            .filter_map(|(index, parameter)| {
                parameter.validate().err().map(|error| DescriptorIssue {
                    handler: self.handler.clone(),
                    location: format!("parameter #{index}"),
                    message: error.to_string(),
                })
            })
            .collect();

        if self.http_methods.is_empty() {
            issues.push(DescriptorIssue {
                handler: self.handler.clone(),
                location: "methods".to_string(),
                message: "no HTTP method declared; operation can never be dispatched".to_string(),
            });
        }

        issues
    }

    /// Every configuration problem, compiling the path template with `options`.
    #[must_use]
    pub fn validate_with(&self, options: PathMatchOptions) -> Vec<DescriptorIssue> {
        let mut issues = self.declaration_issues();
        if let Err(error) = PathMatcher::compile(&self.resource_path, options) {
            issues.push(DescriptorIssue {
                handler: self.handler.clone(),
                location: "path".to_string(),
                message: error.to_string(),
            });
        }
        issues
    }

    /// [`validate_with`](Self::validate_with) under default path matching options.
    #[must_use]
    pub fn validate(&self) -> Vec<DescriptorIssue> {
        self.validate_with(PathMatchOptions::default())
    }
}

/// A configuration problem found by [`OperationDescriptor::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorIssue {
    pub handler: HandlerRef,
    pub location: String,
    pub message: String,
}

impl fmt::Display for DescriptorIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.handler, self.location, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_from_tag() {
        assert_eq!(DeclaredType::from_tag("Number"), DeclaredType::Number);
        assert_eq!(DeclaredType::from_tag("boolean"), DeclaredType::Boolean);
        assert_eq!(
            DeclaredType::from_tag("Pet"),
            DeclaredType::Complex("Pet".to_string())
        );
    }

    #[test]
    fn test_complex_header_is_rejected() {
        let p = ParameterDescriptor::header("x-pet", DeclaredType::Complex("Pet".into()));
        assert!(matches!(
            p.validate(),
            Err(BindError::ComplexNonPayload { kind: ParameterKind::Header, .. })
        ));
    }

    #[test]
    fn test_context_needs_context_type_ref() {
        let wrong = ParameterDescriptor {
            kind: ParameterKind::Context,
            declared_type: DeclaredType::Complex("Request".into()),
            name: Some(ParameterName::NamedKey("Request".into())),
        };
        assert_eq!(wrong.validate(), Err(BindError::MissingContextType));
        assert!(ParameterDescriptor::context(ContextTypeRef::request())
            .validate()
            .is_ok());
    }

    #[test]
    fn test_body_and_named_primitives_are_valid() {
        assert!(ParameterDescriptor::body(DeclaredType::Complex("Pet".into()))
            .validate()
            .is_ok());
        assert!(ParameterDescriptor::query("limit", DeclaredType::Number)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_declaration_issues_skip_template_compilation() {
        let op = OperationDescriptor {
            resource_path: "pets/:id".to_string(),
            http_methods: Vec::new(),
            consumed_media_types: MediaTypeSet::new(),
            produced_media_types: MediaTypeSet::new(),
            parameters: Vec::new(),
            handler: HandlerRef::new("h"),
        };
        let declared = op.declaration_issues();
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].location, "methods");

        let all = op.validate_with(PathMatchOptions {
            case_insensitive: true,
            trailing_slash: true,
        });
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].location, "path");
    }
}
