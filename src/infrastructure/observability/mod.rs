mod init_tracing;
mod prompt_sanitizer;
mod request_id;
mod tracing_config;

pub use init_tracing::{DEFAULT_FILTER, init_tracing};
pub use prompt_sanitizer::sanitize_prompt;
pub use request_id::{
    MAX_REQUEST_ID_LEN, REQUEST_ID_HEADER, RequestId, request_id_middleware, resolve_request_id,
};
pub use tracing_config::{LogFormat, TracingConfig};
