use axum::{
    routing::{delete, get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{
    admin_cancel_reservation, book_slot, cancel_reservation, show_all_reservations,
    show_my_reservations,
};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservation_routers = Router::new()
        .route("/", post(book_slot))
        .route("/my", get(show_my_reservations))
        .route("/:reservation_id", delete(cancel_reservation));

    let admin_routers = Router::new()
        .route("/", get(show_all_reservations))
        .route("/:reservation_id", delete(admin_cancel_reservation));

    Router::new()
        .nest("/reservations", reservation_routers)
        .nest("/admin/reservations", admin_routers)
}
