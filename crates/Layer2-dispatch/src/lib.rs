//! # seedbridge-dispatch
//!
//! Endpoint dispatch engine for SeedBridge.
//! Turns a logical endpoint name plus a payload (or a request for synthetic
//! data) into an outbound REST call against the target API.
//!
//! ## Features
//! - Immutable endpoint registry loaded from configuration
//! - Payload validation and fake-data synthesis from the same schema
//! - Automatic retry with exponential backoff on transient failures
//! - Structured `DispatchResult` instead of raised errors
//!
//! ## 흐름
//!
//! ```text
//! Dispatcher::dispatch(name, request)
//!   ├── EndpointRegistry::resolve(name)      -> UnknownEndpoint
//!   ├── PayloadResolver::resolve(spec, req)  -> PayloadValidationError
//!   └── ResilientExecutor::execute(..)       -> Success / ClientError / TransientExhausted
//! ```

pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod fake;
pub mod registry;
pub mod resolver;
pub mod result;
pub mod retry;
pub mod schema;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

// Facade
pub use dispatcher::{join_url, AdminEndpoint, Dispatcher, SeedOutcome};

// Registry and schema
pub use registry::{EndpointRegistry, EndpointSpec, FieldSpec, HttpMethod};
pub use schema::{validate, FieldType, TypeMismatch};

// Payload
pub use fake::{FakeValueProducer, FieldCategory, RandomFaker};
pub use resolver::{Payload, PayloadRequest, PayloadResolver};

// Execution
pub use executor::ResilientExecutor;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

// Error and result
pub use error::{DispatchError, TransportError};
pub use result::{DispatchResult, Failure, FailureKind};
