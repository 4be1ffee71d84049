//! Handing the visible trip to a map widget.

use geo_types::Point as GeoPoint;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::{
    config::MapConfig,
    selection::SelectionState,
    trip::{line_string, Position, Trip},
};

/// Something that can draw one polyline around a center.
pub trait MapRenderer {
    type Output;

    fn draw(&self, center: Position, vehicle_id: Option<&str>, line: &[Position])
        -> Self::Output;
}

/// Draw the first visible trip of `state`, centered on its first point.
/// Without anything to show the view falls back to `default_center`.
pub fn render<R: MapRenderer>(
    renderer: &R,
    state: &SelectionState,
    default_center: Position,
) -> R::Output {
    let trip: Option<&Trip> = state.visible_trips().next();
    let line = trip.map(|x| x.coordinates.as_slice()).unwrap_or_default();
    let center = line.first().copied().unwrap_or(default_center);
    renderer.draw(center, trip.map(|x| x.vehicle_id.as_str()), line)
}

/// Emits a FeatureCollection with simplestyle stroke properties and the view
/// as foreign members. `center` is `[latitude, longitude]` like the
/// configured default, the line itself is GeoJSON `[longitude, latitude]`.
#[derive(Debug, Clone)]
pub struct GeoJsonRenderer {
    pub zoom: u8,
    pub weight: u32,
    pub color: String,
}

impl From<&MapConfig> for GeoJsonRenderer {
    fn from(value: &MapConfig) -> Self {
        Self {
            zoom: value.zoom,
            weight: value.weight,
            color: value.color.clone(),
        }
    }
}

impl MapRenderer for GeoJsonRenderer {
    type Output = FeatureCollection;

    fn draw(
        &self,
        center: Position,
        vehicle_id: Option<&str>,
        line: &[Position],
    ) -> FeatureCollection {
        let geometry = match line {
            [] => None,
            [x] => Some(Geometry::new(Value::from(&GeoPoint::from(*x)))),
            _ => Some(Geometry::new(Value::from(&line_string(line)))),
        };

        let features = geometry
            .map(|geometry| {
                let mut properties = JsonObject::new();
                properties.insert("vehicle".to_owned(), json!(vehicle_id));
                properties.insert("stroke".to_owned(), json!(self.color));
                properties.insert("stroke-width".to_owned(), json!(self.weight));
                Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .into_iter()
            .collect();

        let mut view = JsonObject::new();
        view.insert(
            "center".to_owned(),
            json!([center.latitude, center.longitude]),
        );
        view.insert("zoom".to_owned(), json!(self.zoom));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(view),
        }
    }
}
