//! Great-circle geometry on a spherical earth.

use coex_ir::Location;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two locations, in kilometers.
pub fn distance_km(a: Location, b: Location) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Location reached from `start` after `distance_km` along `bearing_deg`
/// (clockwise from north).
pub fn destination(start: Location, bearing_deg: f64, distance_km: f64) -> Location {
    let delta = distance_km / EARTH_RADIUS_KM;
    let theta = bearing_deg.to_radians();
    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    let lon = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;
    Location::new(lat2.to_degrees(), lon)
}

/// Move east by `east_km` then north by `north_km`; negative values go west/south.
pub fn offset(start: Location, east_km: f64, north_km: f64) -> Location {
    let east = if east_km >= 0.0 {
        destination(start, 90.0, east_km)
    } else {
        destination(start, 270.0, -east_km)
    };
    if north_km >= 0.0 {
        destination(east, 0.0, north_km)
    } else {
        destination(east, 180.0, -north_km)
    }
}
