//! HTTP request/response model.
//!
//! # Data Flow
//! ```text
//! RequestBuilder (method, target, params, headers, body)
//!     → request.rs (validate, resolve phase endpoint, freeze descriptor)
//!     → query.rs (percent-encode params onto the address)
//!     → [dispatcher races transport against timer]
//!     → response.rs (normalize into ResponseEnvelope)
//!     → caller
//! ```

pub mod query;
pub mod request;
pub mod request_id;
pub mod response;

pub use query::{with_query, QueryParams};
pub use request::{
    EffectiveOptions, Method, RequestBuilder, RequestDescriptor, RequestError, RequestOptions,
    ResolvedDefaults,
};
pub use request_id::RequestId;
pub use response::{ResponseEnvelope, TIMEOUT_MESSAGE, TRANSPORT_FAILURE_MESSAGE};
