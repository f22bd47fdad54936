//! Pet routes under /pet.

use crate::handlers::pet::{
    add_pet, delete_pet, edit_pet, find_by_category, find_by_category_named_upload, find_by_id,
    find_by_status, find_by_tags, upload_image,
};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn pet_routes(state: AppState) -> Router {
    Router::new()
        .route("/pet", post(add_pet).put(edit_pet))
        // lookup names are also valid `{id}` segments for the write operations
        .route("/pet/findByStatus", get(find_by_status).delete(delete_pet))
        .route("/pet/findByTags", get(find_by_tags).delete(delete_pet))
        .route("/pet/findByCategory/:category_id", get(find_by_category))
        .route(
            "/pet/findByCategory/uploadImage",
            get(find_by_category_named_upload).post(upload_image),
        )
        .route("/pet/:id", get(find_by_id).delete(delete_pet))
        .route("/pet/:id/uploadImage", post(upload_image))
        .with_state(state)
}
