use super::{
    auth::build_auth_routers, facility::build_facility_routers,
    health::build_health_check_routers, reservation::build_reservation_routers,
    slot::build_slot_routers, user::build_user_router,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_auth_routers())
        .merge(build_facility_routers())
        .merge(build_slot_routers())
        .merge(build_reservation_routers())
        .merge(build_user_router());
    Router::new().nest("/api/v1", router)
}
