use std::sync::Arc;

use crate::application::services::{SessionRegistry, UploadService};

#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub registry: Arc<SessionRegistry>,
}
