//! Shared application state for all routes.

use crate::auth::Authenticator;
use crate::service::PetService;
use crate::store::PetStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PetService>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(store: Arc<dyn PetStore>, auth: Authenticator) -> Self {
        Self::with_service(PetService::new(store), auth)
    }

    pub fn with_service(service: PetService, auth: Authenticator) -> Self {
        AppState {
            service: Arc::new(service),
            auth: Arc::new(auth),
        }
    }
}
