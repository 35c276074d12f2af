use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::tracking;

#[derive(OpenApi)]
#[openapi(
    paths(
        tracking::start,
        tracking::stop,
        tracking::push_sample,
        tracking::status,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::gate::LocationSample,
            crate::tracker::TrackerMode,
            crate::tracker::TrackerStatus,
            crate::tracker::TrackerCounters,
        )
    ),
    info(
        title = "Track-O-Mat Tracking API",
        description = "Local control of the location tracking session",
        version = "0.1.0"
    ),
    tags(
        (name = "tracking", description = "Tracking session control")
    )
)]
pub struct ApiDoc;
