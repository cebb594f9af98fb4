use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/advertisements", advertisement_routes())
}

fn advertisement_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::advertisement::list_advertisements,
            handlers::advertisement::create_advertisement
        ))
        .routes(routes!(
            handlers::advertisement::get_advertisement,
            handlers::advertisement::update_advertisement,
            handlers::advertisement::delete_advertisement
        ))
        .routes(routes!(handlers::advertisement::restore_advertisement))
        .layer(handlers::advertisement::upload_body_limit())
}
