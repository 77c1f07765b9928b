//! Impact-footprint estimators.
//!
//! Pure functions mapping source-specific magnitude and intensity fields to
//! an approximate impact radius. Each formula mirrors the operational scale
//! of its hazard type; the clamps keep malformed input (magnitude typos,
//! zero wind fields) from producing degenerate micro or mega circles.

/// Meters per degree of latitude, also used for longitude after scaling by
/// `cos(latitude)`.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Fixed footprint for an open volcanic-activity event.
pub const VOLCANO_RADIUS_M: f64 = 20_000.0;

/// Fixed footprints for severe local-storm reports, by subtype.
pub const TORNADO_REPORT_RADIUS_M: f64 = 8_000.0;
pub const WIND_REPORT_RADIUS_M: f64 = 6_000.0;
pub const HAIL_REPORT_RADIUS_M: f64 = 5_000.0;

/// Nominal ~1 km sensor pixels when scan/track geometry is unavailable.
const WILDFIRE_FALLBACK_RADIUS_M: f64 = 500.0;

const SEISMIC_RADIUS_KM: (f64, f64) = (2.0, 300.0);
const WILDFIRE_RADIUS_M: (f64, f64) = (150.0, 2_000.0);
const CYCLONE_RADIUS_KM: (f64, f64) = (60.0, 600.0);

/// Felt-area radius for an earthquake, in kilometers.
///
/// Approximate felt area `A` (km²): `log10 A ≈ 1.02·M − 1.83` (Johnston
/// 1996), converted to an area-equivalent circle. Deep events attenuate:
/// half the radius below 300 km, 0.7× below 70 km.
pub fn seismic_radius_km(magnitude: f64, depth_km: Option<f64>) -> f64 {
    let mut radius_km = felt_area_radius_km(magnitude);
    if let Some(depth) = depth_km {
        if depth > 300.0 {
            radius_km *= 0.5;
        } else if depth > 70.0 {
            radius_km *= 0.7;
        }
    }
    radius_km.clamp(SEISMIC_RADIUS_KM.0, SEISMIC_RADIUS_KM.1)
}

fn felt_area_radius_km(magnitude: f64) -> f64 {
    let area_km2 = 10f64.powf(1.02 * magnitude - 1.83);
    (area_km2 / std::f64::consts::PI).sqrt()
}

/// Sensor-footprint radius for a wildfire detection, in meters.
///
/// With scan/track angles available, converts the across/along-track pixel
/// dimensions (degrees, longitude scaled by `cos(latitude)`) to an
/// area-equivalent circle. Without them, a fixed 500 m stands in for the
/// nominal sensor pixel.
pub fn wildfire_radius_m(scan_deg: Option<f64>, track_deg: Option<f64>, latitude: f64) -> f64 {
    match (scan_deg, track_deg) {
        (Some(scan), Some(track)) => {
            let width_m = scan * METERS_PER_DEGREE * latitude.to_radians().cos().max(0.0);
            let height_m = track * METERS_PER_DEGREE;
            let radius_m = ((width_m * height_m).max(1.0) / std::f64::consts::PI).sqrt();
            radius_m.clamp(WILDFIRE_RADIUS_M.0, WILDFIRE_RADIUS_M.1)
        }
        _ => WILDFIRE_FALLBACK_RADIUS_M,
    }
}

/// Impact radius for a tropical cyclone, in kilometers.
///
/// Ordered decision cascade: sustained wind in knots, then the
/// Saffir-Simpson category code, then the status string, then the supplied
/// default. The result is clamped to [60, 600] km.
pub fn cyclone_radius_km(
    wind_kt: Option<f64>,
    saffir_simpson: Option<i64>,
    status: Option<&str>,
    default_km: f64,
) -> f64 {
    let radius_km = if let Some(wind) = wind_kt {
        wind_band_radius_km(wind.max(0.0))
    } else if let Some(category) = saffir_simpson {
        category_radius_km(category)
    } else if let Some(status) = status {
        status_radius_km(status).unwrap_or(default_km)
    } else {
        default_km
    };
    radius_km.clamp(CYCLONE_RADIUS_KM.0, CYCLONE_RADIUS_KM.1)
}

fn wind_band_radius_km(kts: f64) -> f64 {
    if kts < 34.0 {
        100.0
    } else if kts < 50.0 {
        150.0
    } else if kts < 64.0 {
        200.0
    } else if kts < 83.0 {
        250.0 // Cat 1
    } else if kts < 96.0 {
        300.0 // Cat 2
    } else if kts < 113.0 {
        350.0 // Cat 3
    } else if kts < 137.0 {
        420.0 // Cat 4
    } else {
        500.0 // Cat 5
    }
}

fn category_radius_km(category: i64) -> f64 {
    match category {
        0 | 1 => 250.0,
        2 => 300.0,
        3 => 350.0,
        4 => 420.0,
        5 => 500.0,
        _ => 200.0,
    }
}

fn status_radius_km(status: &str) -> Option<f64> {
    let status = status.to_ascii_uppercase();
    if status.contains("TD") {
        Some(120.0)
    } else if status.contains("TS") {
        Some(200.0)
    } else if status.contains("HU") || status.contains("HURRICANE") {
        Some(320.0)
    } else {
        None
    }
}
