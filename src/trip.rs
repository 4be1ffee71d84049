//! Turning ping rows into one polyline per vehicle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use geo::{BoundingRect, Distance, Haversine, Point as GeoPoint};
use geo_types::{coord, LineString, Rect};
use log::debug;
use serde::Serialize;

use crate::{decode::decode, ingest::RawPing, timestamp::Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Position> for GeoPoint {
    fn from(value: Position) -> Self {
        GeoPoint::new(value.longitude, value.latitude)
    }
}

/// A decoded ping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub position: Position,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub vehicle_id: String,
    pub coordinates: Vec<Position>,
}

impl Trip {
    pub fn line_string(&self) -> LineString {
        line_string(&self.coordinates)
    }
}

/// Positions as a geo line, x being longitude.
pub fn line_string(coordinates: &[Position]) -> LineString {
    coordinates
        .iter()
        .map(|x| coord! { x: x.longitude, y: x.latitude })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub vehicle_id: String,
    pub points: usize,
    pub length_m: f64,
    #[serde(skip)]
    pub bounds: Option<Rect>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl TripSummary {
    fn new(vehicle_id: &str, points: &[Point]) -> Self {
        // fold from +0.0, an empty f64 sum is -0.0
        let length_m = points
            .windows(2)
            .map(|w| {
                let from = GeoPoint::from(w[0].position);
                let to = GeoPoint::from(w[1].position);
                Haversine::distance(from, to)
            })
            .fold(0.0, |acc, x| acc + x);

        let positions: Vec<_> = points.iter().map(|x| x.position).collect();

        let mut times = points.iter().filter_map(|x| x.timestamp.valid());
        let first = times.next();
        let (first_seen, last_seen) = match first {
            Some(first) => times.fold((Some(first), Some(first)), |(lo, hi), x| {
                (lo.min(Some(x)), hi.max(Some(x)))
            }),
            None => (None, None),
        };

        Self {
            vehicle_id: vehicle_id.to_owned(),
            points: points.len(),
            length_m,
            bounds: line_string(&positions).bounding_rect(),
            first_seen,
            last_seen,
        }
    }
}

#[derive(Debug, Default)]
struct Dropped {
    vehicle: usize,
    latitude: usize,
    longitude: usize,
}

/// Decoded points grouped by vehicle in first-seen order, each group sorted
/// by time and stripped of consecutive repeats.
fn group(rows: impl IntoIterator<Item = RawPing>) -> Vec<(String, Vec<Point>)> {
    let mut groups: Vec<(String, Vec<Point>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut dropped = Dropped::default();

    for ping in rows {
        let Some(vehicle) = ping.vehicle_id.filter(|x| !x.is_empty()) else {
            dropped.vehicle += 1;
            continue;
        };
        let Some(latitude) = decode(ping.latitude.as_deref()) else {
            dropped.latitude += 1;
            continue;
        };
        let Some(longitude) = decode(ping.longitude.as_deref()) else {
            dropped.longitude += 1;
            continue;
        };

        let point = Point {
            position: Position::new(latitude, longitude),
            timestamp: Timestamp::parse(ping.timestamp.as_deref()),
        };

        match index.get(&vehicle) {
            Some(&i) => groups[i].1.push(point),
            None => {
                index.insert(vehicle.clone(), groups.len());
                groups.push((vehicle, vec![point]));
            }
        }
    }

    debug!(
        "dropped rows: {} without vehicle, {} bad latitude, {} bad longitude",
        dropped.vehicle, dropped.latitude, dropped.longitude
    );

    for (_, points) in &mut groups {
        // stable, equal times keep file order
        points.sort_by_key(|x| x.timestamp);
        points.dedup_by(|next, prev| next.position == prev.position);
    }

    groups
}

/// Build one trip per vehicle seen in `rows`, in first-seen order.
pub fn aggregate(rows: impl IntoIterator<Item = RawPing>) -> Vec<Trip> {
    group(rows)
        .into_iter()
        .map(|(vehicle_id, points)| Trip {
            vehicle_id,
            coordinates: points.into_iter().map(|x| x.position).collect(),
        })
        .collect()
}

pub fn aggregate_with_summaries(
    rows: impl IntoIterator<Item = RawPing>,
) -> (Vec<Trip>, Vec<TripSummary>) {
    group(rows)
        .into_iter()
        .map(|(vehicle_id, points)| {
            let summary = TripSummary::new(&vehicle_id, &points);
            let trip = Trip {
                vehicle_id,
                coordinates: points.into_iter().map(|x| x.position).collect(),
            };
            (trip, summary)
        })
        .unzip()
}
