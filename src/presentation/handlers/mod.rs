mod ask;
mod error_response;
mod health;
mod upload;

pub use ask::{AskRequest, AskResponse, SESSION_NOT_FOUND_DETAIL, ask_handler};
pub use error_response::ErrorResponse;
pub use health::{health_handler, root_handler};
pub use upload::{UploadResponse, upload_handler};
