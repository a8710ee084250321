use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/appointment",
            get(handlers::appointment::list_appointments)
                .post(handlers::appointment::create_appointment)
                .fallback(handlers::appointment::collection_method_not_allowed),
        )
        .route(
            "/appointment/:id",
            get(handlers::appointment::get_appointment)
                .patch(handlers::appointment::update_appointment)
                .delete(handlers::appointment::delete_appointment)
                .fallback(handlers::appointment::item_method_not_allowed),
        )
}
