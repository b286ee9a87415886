use super::core::{PathMatchOptions, PathMatcher, PathTemplateError};
use crate::handler::HandlerRef;
use crate::operation::OperationDescriptor;
use crate::server::ParamVec;
use std::fmt;
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// An operation whose path template was compiled at registration.
///
/// The matcher is built exactly once and never recompiled.
#[derive(Debug, Clone)]
pub struct RegisteredOperation {
    descriptor: OperationDescriptor,
    matcher: PathMatcher,
}

impl RegisteredOperation {
    #[must_use]
    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }
}

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidTemplate {
        handler: HandlerRef,
        source: PathTemplateError,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidTemplate { handler, source } => {
                write!(f, "cannot register operation {handler}: {source}")
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::InvalidTemplate { source, .. } => Some(source),
        }
    }
}

/// Append-only, ordered store of compiled operations.
///
/// Registration order is significant: lookups visit operations in the order they were
/// registered, so the first full match wins. There is no removal.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    options: PathMatchOptions,
    operations: Vec<RegisteredOperation>,
}

impl OperationRegistry {
    #[must_use]
    pub fn new(options: PathMatchOptions) -> Self {
        Self {
            options,
            operations: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> PathMatchOptions {
        self.options
    }

    /// Compile the descriptor's path template and append it.
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<(), RegistryError> {
        let matcher = PathMatcher::compile(&descriptor.resource_path, self.options).map_err(
            |source| RegistryError::InvalidTemplate {
                handler: descriptor.handler.clone(),
                source,
            },
        )?;

        let names = matcher.capture_names();
        if names
            .iter()
            .enumerate()
            .any(|(i, n)| names[..i].contains(n))
        {
            warn!(
                handler = %descriptor.handler,
                template = %matcher.template(),
                "Duplicate capture name in path template; the last segment wins"
            );
        }

        info!(
            index = self.operations.len(),
            handler = %descriptor.handler,
            template = %matcher.template(),
            methods = ?descriptor.http_methods,
            consumes = ?descriptor.consumed_media_types.iter().collect::<Vec<_>>(),
            produces = ?descriptor.produced_media_types.iter().collect::<Vec<_>>(),
            "Operation registered"
        );

        self.operations.push(RegisteredOperation {
            descriptor,
            matcher,
        });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Registered operations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredOperation> {
        self.operations.iter()
    }

    /// Visit every operation whose template matches `path`, in registration order.
    ///
    /// The visitor receives the operation and its captured segments; returning
    /// [`ControlFlow::Break`] stops the walk and its value is returned.
    pub fn find_eligible_by_path<'a, B, F>(&'a self, path: &str, mut visitor: F) -> Option<B>
    where
        F: FnMut(&'a RegisteredOperation, ParamVec) -> ControlFlow<B>,
    {
        for operation in &self.operations {
            let Some(captures) = operation.matcher.captures(path) else {
                continue;
            };
            debug!(
                path = %path,
                template = %operation.matcher.template(),
                handler = %operation.descriptor.handler,
                "Path eligible"
            );
            if let ControlFlow::Break(found) = visitor(operation, captures) {
                return Some(found);
            }
        }
        None
    }
}
