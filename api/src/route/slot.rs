use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::slot::{delete_slot, register_slot, show_slot_list};

pub fn build_slot_routers() -> Router<AppRegistry> {
    let slot_routers = Router::new()
        .route("/", post(register_slot))
        .route("/", get(show_slot_list))
        .route("/:slot_id", delete(delete_slot));

    Router::new().nest("/facilities/:facility_id/slots", slot_routers)
}
