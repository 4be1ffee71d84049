use std::sync::Arc;

use crate::trip::{Trip, TripSummary};

/// Snapshot of what is loaded and what is shown.
///
/// Never mutated in place: every transition returns a new snapshot sharing
/// the trip set with the old one.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    trips: Arc<Vec<Trip>>,
    summaries: Arc<Vec<TripSummary>>,
    active: Option<String>,
    visible: Vec<usize>,
}

impl SelectionState {
    /// Fresh state for a new upload, with the first vehicle active.
    pub fn load_trips(trips: Vec<Trip>) -> Self {
        Self::load(trips, Vec::new())
    }

    /// Like [`Self::load_trips`], keeping summaries that line up with `trips`.
    pub fn load_summarized(trips: Vec<Trip>, summaries: Vec<TripSummary>) -> Self {
        debug_assert!(summaries.is_empty() || summaries.len() == trips.len());
        Self::load(trips, summaries)
    }

    fn load(trips: Vec<Trip>, summaries: Vec<TripSummary>) -> Self {
        let active = trips.first().map(|x| x.vehicle_id.clone());
        let mut state = Self {
            trips: Arc::new(trips),
            summaries: Arc::new(summaries),
            active: None,
            visible: Vec::new(),
        };
        if let Some(active) = active {
            state = state.select_vehicle(&active);
        }
        state
    }

    pub fn select_vehicle(&self, vehicle_id: &str) -> Self {
        let visible = self
            .trips
            .iter()
            .enumerate()
            .filter(|(_, x)| x.vehicle_id == vehicle_id)
            .map(|(i, _)| i)
            .collect();

        Self {
            trips: self.trips.clone(),
            summaries: self.summaries.clone(),
            active: Some(vehicle_id.to_owned()),
            visible,
        }
    }

    pub fn all_trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Vehicle ids in the order they first appear in the file.
    pub fn vehicles(&self) -> impl Iterator<Item = &str> {
        self.trips.iter().map(|x| x.vehicle_id.as_str())
    }

    pub fn active_vehicle(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn visible_trips(&self) -> impl Iterator<Item = &Trip> {
        self.visible.iter().map(|&i| &self.trips[i])
    }

    pub fn summaries(&self) -> &[TripSummary] {
        &self.summaries
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}
