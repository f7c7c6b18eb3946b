// Building geometry derived from the aggregate envelope areas of reference buildings.

use tracing::debug;

/// Assumed ratio between the lengths of the external walls and the frame depth, used when
/// the envelope areas do not fit a rectangular footprint.
const FALLBACK_LENGTH_TO_DEPTH_RATIO: f64 = 1.5;

/// Calculate the building frame depth in metres from the envelope dimensions.
///
/// Assumes a rectangular footprint with sides `d` and `l`, so that the facade perimeter is
/// `A_facade / (n h) = 2 (d + l)` and the ground floor area is `A_floor = d l`. The frame
/// depth is the shorter side. When no such rectangle exists, the depth is estimated from
/// a fixed length-to-depth ratio instead.
///
/// Arguments:
/// * `facade_area` - total area of external walls and windows, in m2
/// * `floor_area` - ground floor area, in m2
/// * `number_of_storeys` - number of storeys above ground
/// * `room_height` - height of a storey, in m
pub fn building_frame_depth(
    facade_area: f64,
    floor_area: f64,
    number_of_storeys: f64,
    room_height: f64,
) -> f64 {
    let half_perimeter = facade_area / (2. * number_of_storeys * room_height);
    let discriminant = half_perimeter.powi(2) - 4. * floor_area;
    if discriminant < 0. {
        debug!(
            facade_area,
            floor_area, "Envelope areas don't fit a rectangular footprint, using fixed ratio"
        );
        return fallback_frame_depth(floor_area);
    }
    (half_perimeter - discriminant.sqrt()) / 2.
}

fn fallback_frame_depth(floor_area: f64) -> f64 {
    (floor_area / FALLBACK_LENGTH_TO_DEPTH_RATIO).sqrt()
}

/// Calculate the window area to external wall ratio.
pub fn window_to_wall_ratio(window_area: f64, wall_area: f64) -> f64 {
    window_area / (window_area + wall_area)
}
