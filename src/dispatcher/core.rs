//! Dispatcher core module - hot path for request dispatch.
//!
//! Matching and binding are pure and synchronous; the only suspension point is the wait
//! for a handler coroutine's reply.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use super::matching::MatchingResult;
use crate::binder::build_arguments;
use crate::exception::{map_failure, DispatchFailure, ExceptionMapper};
use crate::handler::{Handler, HandlerCall, HandlerRef};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::media::{get_requested_media_type, supports_requested_media_types, DEFAULT_MEDIA_TYPE};
use crate::operation::OperationDescriptor;
use crate::responder::build_response;
use crate::router::{OperationRegistry, RegisteredOperation, RegistryError};
use crate::runtime_config::RuntimeConfig;
use crate::server::{ParamVec, Request, Response};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::StatusCode;
use may::coroutine;
use may::sync::mpsc;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What a handler coroutine sends back.
#[derive(Debug)]
enum HandlerOutcome {
    Completed(Value),
    Failed(anyhow::Error),
    Panicked(String),
    /// The invocation coroutine could not be started.
    Unstarted,
}

/// One queued handler invocation.
struct Invocation {
    call: HandlerCall,
    reply_tx: mpsc::Sender<HandlerOutcome>,
}

type InvocationSender = mpsc::Sender<Invocation>;

/// The operation chosen for a request.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub operation: &'a RegisteredOperation,
    /// Raw captured path segments, in template order.
    pub path_params: ParamVec,
    /// Negotiated response media type.
    pub media_type: String,
}

impl Selection<'_> {
    #[must_use]
    pub fn descriptor(&self) -> &OperationDescriptor {
        self.operation.descriptor()
    }
}

/// Outcome of matching a request against the registry, before any handler runs.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    Matched(Selection<'a>),
    /// Nothing matched fully; carries the closest-reason status.
    Fallback(StatusCode, MatchingResult),
}

/// Request dispatcher: registry, handler coroutines and exception mappers.
///
/// All registration happens before serving; afterwards the dispatcher is only read and
/// can be shared behind an `Arc`.
pub struct Dispatcher {
    config: RuntimeConfig,
    registry: OperationRegistry,
    handlers: HashMap<HandlerRef, Mutex<InvocationSender>>,
    exception_mappers: Vec<Box<dyn ExceptionMapper>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Dispatcher {
            config,
            registry: OperationRegistry::new(config.path_matching),
            handlers: HashMap::new(),
            exception_mappers: Vec::new(),
        }
    }

    /// A dispatcher configured from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Register one operation; order of registration is matching order.
    ///
    /// The path template is compiled once, by the registry, under this dispatcher's
    /// matching options; a malformed template is the returned error.
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<(), RegistryError> {
        let issues = descriptor.declaration_issues();
        self.registry.register(descriptor)?;
        for issue in &issues {
            warn!(issue = %issue, "Operation registered with configuration problem");
        }
        Ok(())
    }

    /// Register every descriptor in order, stopping at the first malformed template.
    pub fn register_endpoints<I>(&mut self, descriptors: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = OperationDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        info!(
            operations = self.registry.len(),
            handlers = self.handlers.len(),
            "Endpoints registered"
        );
        Ok(())
    }

    /// Append an exception mapper; mappers are consulted in the order added.
    pub fn add_exception_mapper<M>(&mut self, mapper: M)
    where
        M: ExceptionMapper + 'static,
    {
        self.exception_mappers.push(Box::new(mapper));
    }

    /// Registers a handler that will serve every operation naming `name`.
    ///
    /// Spawns one accept coroutine reading invocations from a channel; each invocation then
    /// runs in a coroutine of its own, so a slow or stuck call only holds up its own request.
    /// Handler panics are caught and reported back as [`DispatchFailure::HandlerPanicked`].
    /// Registering the same name again replaces the previous handler; its accept coroutine
    /// exits once its channel closes.
    ///
    /// # Safety
    ///
    /// This function is marked unsafe because it calls `may::coroutine::Builder::spawn()`,
    /// which is unsafe in the `may` runtime. The caller must ensure the handler does not
    /// block the coroutine scheduler with thread-local state or long synchronous waits.
    pub unsafe fn register_handler<H>(&mut self, name: &str, handler: H)
    where
        H: Handler,
    {
        let (tx, rx) = mpsc::channel::<Invocation>();
        let handler_ref = HandlerRef::new(name);
        let coroutine_ref = handler_ref.clone();
        let stack_size = self.config.stack_size;
        let handler = Arc::new(handler);

        // SAFETY: the handler is Send + Sync + 'static and owns everything it touches;
        // replies travel over the per-invocation channel, never through shared state.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(format!("handler-{name}"))
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler = %coroutine_ref,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );
                    for invocation in rx.iter() {
                        spawn_invocation(&coroutine_ref, &handler, invocation, stack_size);
                    }
                    debug!(handler = %coroutine_ref, "Handler coroutine exit");
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler = %handler_ref,
                error = %e,
                stack_size = stack_size,
                "Failed to spawn handler coroutine - CRITICAL"
            );
            return;
        }

        if self
            .handlers
            .insert(handler_ref.clone(), Mutex::new(tx))
            .is_some()
        {
            warn!(handler = %handler_ref, "Replaced existing handler - old coroutine will exit");
        }
        info!(
            handler = %handler_ref,
            total_handlers = self.handlers.len(),
            "Handler registered successfully"
        );
    }

    #[must_use]
    pub fn has_handler(&self, name: &HandlerRef) -> bool {
        self.handlers.contains_key(name)
    }

    /// Match `request` against the registry without invoking anything.
    ///
    /// Operations are examined in registration order; the first one whose path, method,
    /// content type and accept header all match is selected.
    #[must_use]
    pub fn resolve(&self, request: &Request) -> Resolution<'_> {
        let content_type = request.header(CONTENT_TYPE.as_str());
        let accept = request.header(ACCEPT.as_str());
        let mut result = MatchingResult::default();

        let selected = self
            .registry
            .find_eligible_by_path(request.path(), |operation, captures| {
                result.path_matched = true;
                let descriptor = operation.descriptor();

                if !descriptor.allows_method(request.method()) {
                    debug!(
                        handler = %descriptor.handler,
                        method = %request.method(),
                        allowed = ?descriptor.http_methods,
                        "Method mismatch"
                    );
                    return ControlFlow::Continue(());
                }
                result.method_matched = true;

                if !supports_requested_media_types(content_type, Some(&descriptor.consumed_media_types)) {
                    debug!(
                        handler = %descriptor.handler,
                        content_type = ?content_type,
                        "Content-Type mismatch"
                    );
                    return ControlFlow::Continue(());
                }
                result.content_type_matched = true;

                if !supports_requested_media_types(accept, Some(&descriptor.produced_media_types)) {
                    debug!(
                        handler = %descriptor.handler,
                        accept = ?accept,
                        "Accept mismatch"
                    );
                    return ControlFlow::Continue(());
                }
                result.accept_matched = true;

                ControlFlow::Break((operation, captures))
            });

        match selected {
            Some((operation, path_params)) => {
                let produced = &operation.descriptor().produced_media_types;
                let media_type = get_requested_media_type(accept, Some(produced))
                    .or_else(|| produced.first().map(str::to_string))
                    .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
                Resolution::Matched(Selection {
                    operation,
                    path_params,
                    media_type,
                })
            }
            None => Resolution::Fallback(result.fallback_status(), result),
        }
    }

    /// Dispatch one request and always produce a response.
    ///
    /// Unmatched requests get a bare 404/405/415/406. Binding and handler failures go
    /// through the exception mappers. Every response carries the request id in
    /// `x-request-id`.
    pub fn handle_request(&self, request: Request) -> Response {
        let request_id = request.request_id();
        let start = Instant::now();

        let selection = match self.resolve(&request) {
            Resolution::Matched(selection) => selection,
            Resolution::Fallback(status, result) => {
                info!(
                    request_id = %request_id,
                    method = %request.method(),
                    path = %request.path(),
                    status = status.as_u16(),
                    matching = ?result,
                    "No operation matched"
                );
                return with_request_id(Response::status_only(status), request_id);
            }
        };

        let handler = selection.descriptor().handler.clone();
        info!(
            request_id = %request_id,
            method = %request.method(),
            path = %request.path(),
            handler = %handler,
            template = %selection.operation.matcher().template(),
            media_type = %selection.media_type,
            "Operation matched"
        );

        let request = Arc::new(request);
        let response = match self.invoke(&selection, &request) {
            Ok(value) => build_response(&value, &selection.media_type),
            Err(failure) => {
                if failure.is_client_error() {
                    warn!(
                        request_id = %request_id,
                        handler = %handler,
                        error = %failure,
                        "Request rejected"
                    );
                } else {
                    error!(
                        request_id = %request_id,
                        handler = %handler,
                        error = %failure,
                        "Dispatch failed"
                    );
                }
                map_failure(&self.exception_mappers, &failure)
            }
        };
        let response = with_request_id(response, request_id);

        info!(
            request_id = %request_id,
            handler = %handler,
            status = response.status(),
            latency_us = start.elapsed().as_micros() as u64,
            "Request completed"
        );
        response
    }

    fn invoke(&self, selection: &Selection<'_>, request: &Arc<Request>) -> Result<Value, DispatchFailure> {
        let descriptor = selection.descriptor();
        let arguments = build_arguments(descriptor, request, &selection.path_params)?;

        let handler = &descriptor.handler;
        let sender = self
            .handlers
            .get(handler)
            .ok_or_else(|| DispatchFailure::HandlerMissing(handler.clone()))?;

        let (reply_tx, reply_rx) = mpsc::channel();
        let invocation = Invocation {
            call: HandlerCall::new(request.request_id(), handler.clone(), arguments),
            reply_tx,
        };

        {
            let sender = sender
                .lock()
                .map_err(|_| DispatchFailure::HandlerUnavailable(handler.clone()))?;
            sender
                .send(invocation)
                .map_err(|_| DispatchFailure::HandlerUnavailable(handler.clone()))?;
        }

        match reply_rx.recv() {
            Ok(HandlerOutcome::Completed(value)) => Ok(value),
            Ok(HandlerOutcome::Failed(e)) => Err(DispatchFailure::Handler(e)),
            Ok(HandlerOutcome::Panicked(message)) => Err(DispatchFailure::HandlerPanicked(message)),
            Ok(HandlerOutcome::Unstarted) | Err(_) => {
                Err(DispatchFailure::HandlerUnavailable(handler.clone()))
            }
        }
    }
}

/// Echo the request id unless an exception mapper already set one.
fn with_request_id(response: Response, request_id: RequestId) -> Response {
    if response.header(REQUEST_ID_HEADER).is_some() {
        return response;
    }
    response.with_header(REQUEST_ID_HEADER, request_id.to_string())
}

/// Run one invocation in its own coroutine and send the outcome back.
fn spawn_invocation<H: Handler>(
    handler_ref: &HandlerRef,
    handler: &Arc<H>,
    invocation: Invocation,
    stack_size: usize,
) {
    let Invocation { call, reply_tx } = invocation;
    let request_id = call.request_id();
    let call_ref = handler_ref.clone();
    let handler = Arc::clone(handler);
    let reply = reply_tx.clone();

    // SAFETY: the coroutine owns its call, its reply sender and a shared handle to a
    // Send + Sync handler.
    let spawn_result = unsafe {
        coroutine::Builder::new()
            .name(format!("handler-{handler_ref}-{request_id}"))
            .stack_size(stack_size)
            .spawn(move || {
                let start = Instant::now();
                let outcome = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    handler.handle(call)
                })) {
                    Ok(Ok(value)) => HandlerOutcome::Completed(value),
                    Ok(Err(e)) => HandlerOutcome::Failed(e),
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!(
                            request_id = %request_id,
                            handler = %call_ref,
                            panic_message = %message,
                            "Handler panicked - CRITICAL"
                        );
                        HandlerOutcome::Panicked(message)
                    }
                };
                debug!(
                    request_id = %request_id,
                    handler = %call_ref,
                    execution_time_us = start.elapsed().as_micros() as u64,
                    "Handler execution complete"
                );
                if reply.send(outcome).is_err() {
                    warn!(
                        request_id = %request_id,
                        handler = %call_ref,
                        "Reply channel closed before handler finished"
                    );
                }
            })
    };

    if let Err(e) = spawn_result {
        error!(
            request_id = %request_id,
            handler = %handler_ref,
            error = %e,
            "Failed to spawn invocation coroutine"
        );
        if reply_tx.send(HandlerOutcome::Unstarted).is_err() {
            debug!(request_id = %request_id, "Reply channel closed before spawn failure reported");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
