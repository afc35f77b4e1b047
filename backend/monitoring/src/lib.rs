//! `opsy-monitoring` — the per-session [`Dashboard`] context and the views
//! that drive it.

pub mod context;
pub mod url;
pub mod zones;

pub use context::Dashboard;
pub use url::dashboard_url;
pub use zones::{
    apply_zone_statuses, check_zones, register_zone_check, HttpZoneSource, Zone, ZoneSource,
    ZonesResponse, ZONE_CHECK_SLUG,
};
