use super::types::{OperationDescriptor, ParameterDescriptor};
use crate::handler::HandlerRef;
use crate::media::MediaTypeSet;
use http::Method;

fn push_method(methods: &mut Vec<Method>, method: Method) {
    if !methods.contains(&method) {
        methods.push(method);
    }
}

/// Enclosing resource metadata shared by several operations.
///
/// Its path is a prefix; its methods and media types are merged into every operation built
/// under it, after the operation's own entries.
#[derive(Debug, Clone, Default)]
pub struct EndpointBuilder {
    resource_path: Option<String>,
    http_methods: Vec<Method>,
    consumes: MediaTypeSet,
    produces: MediaTypeSet,
}

impl EndpointBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path(mut self, prefix: &str) -> Self {
        self.resource_path = Some(prefix.to_string());
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        push_method(&mut self.http_methods, method);
        self
    }

    #[must_use]
    pub fn consumes(mut self, media_type: &str) -> Self {
        self.consumes.insert(media_type);
        self
    }

    #[must_use]
    pub fn produces(mut self, media_type: &str) -> Self {
        self.produces.insert(media_type);
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        self.resource_path.as_deref().unwrap_or("")
    }
}

/// Builder for one [`OperationDescriptor`].
///
/// ```rust
/// use restwire::operation::{DeclaredType, EndpointBuilder, OperationBuilder, ParameterDescriptor};
/// use http::Method;
///
/// let pets = EndpointBuilder::new().path("/pets").produces("application/json");
/// let op = OperationBuilder::new("get_pet")
///     .path("/:id")
///     .method(Method::GET)
///     .param(ParameterDescriptor::path("id", DeclaredType::Number))
///     .build_under(&pets);
/// assert_eq!(op.resource_path, "/pets/:id");
/// assert!(op.produced_media_types.contains("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    handler: HandlerRef,
    resource_path: Option<String>,
    http_methods: Vec<Method>,
    consumes: MediaTypeSet,
    produces: MediaTypeSet,
    parameters: Vec<ParameterDescriptor>,
}

impl OperationBuilder {
    #[must_use]
    pub fn new(handler: impl Into<HandlerRef>) -> Self {
        Self {
            handler: handler.into(),
            resource_path: None,
            http_methods: Vec::new(),
            consumes: MediaTypeSet::new(),
            produces: MediaTypeSet::new(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.resource_path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        push_method(&mut self.http_methods, method);
        self
    }

    #[must_use]
    pub fn consumes(mut self, media_type: &str) -> Self {
        self.consumes.insert(media_type);
        self
    }

    #[must_use]
    pub fn produces(mut self, media_type: &str) -> Self {
        self.produces.insert(media_type);
        self
    }

    /// Append the next positional parameter.
    #[must_use]
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Build without an enclosing endpoint; a missing path is `/`.
    #[must_use]
    pub fn build(self) -> OperationDescriptor {
        self.build_under(&EndpointBuilder::new())
    }

    /// Build with the endpoint's prefix and metadata merged in.
    #[must_use]
    pub fn build_under(self, endpoint: &EndpointBuilder) -> OperationDescriptor {
        let mut resource_path = String::from(endpoint.prefix());
        resource_path.push_str(self.resource_path.as_deref().unwrap_or(""));
        if resource_path.is_empty() {
            resource_path.push('/');
        }

        let mut http_methods = self.http_methods;
        for method in &endpoint.http_methods {
            push_method(&mut http_methods, method.clone());
        }

        let mut consumed_media_types = self.consumes;
        consumed_media_types.extend(endpoint.consumes.iter());
        let mut produced_media_types = self.produces;
        produced_media_types.extend(endpoint.produces.iter());

        OperationDescriptor {
            resource_path,
            http_methods,
            consumed_media_types,
            produced_media_types,
            parameters: self.parameters,
            handler: self.handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_path_is_root() {
        let op = OperationBuilder::new("index").method(Method::GET).build();
        assert_eq!(op.resource_path, "/");
    }

    #[test]
    fn test_endpoint_entries_are_appended_and_deduped() {
        let endpoint = EndpointBuilder::new()
            .path("/api")
            .method(Method::GET)
            .method(Method::HEAD)
            .produces("application/json")
            .consumes("text/plain");
        let op = OperationBuilder::new("h")
            .path("/items")
            .method(Method::HEAD)
            .produces("application/xml")
            .produces("application/json")
            .build_under(&endpoint);

        assert_eq!(op.resource_path, "/api/items");
        assert_eq!(op.http_methods, vec![Method::HEAD, Method::GET]);
        assert_eq!(
            op.produced_media_types.iter().collect::<Vec<_>>(),
            vec!["application/xml", "application/json"]
        );
        assert_eq!(op.consumed_media_types.iter().collect::<Vec<_>>(), vec!["text/plain"]);
    }

    #[test]
    fn test_endpoint_prefix_alone() {
        let op = OperationBuilder::new("list")
            .method(Method::GET)
            .build_under(&EndpointBuilder::new().path("/pets"));
        assert_eq!(op.resource_path, "/pets");
    }
}
