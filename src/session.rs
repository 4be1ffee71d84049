//! The single writer of the selection state.

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use crate::{
    ingest::RawPing,
    selection::SelectionState,
    trip::{aggregate_with_summaries, Trip},
};

/// Holds the current snapshot and tells subscribers whenever it is swapped.
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<Arc<SelectionState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arc::new(SelectionState::default()));
        Self { state }
    }

    pub fn snapshot(&self) -> Arc<SelectionState> {
        self.state.borrow().clone()
    }

    /// Receiver that is marked changed on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SelectionState>> {
        self.state.subscribe()
    }

    /// Replace everything with the trips built from `rows`. `None` (an upload
    /// without data rows) leaves the current state alone.
    pub fn upload(&self, rows: Option<Vec<RawPing>>) -> Arc<SelectionState> {
        let Some(rows) = rows else {
            info!("upload has no data rows, keeping current trips");
            return self.snapshot();
        };

        let count = rows.len();
        let (trips, summaries) = aggregate_with_summaries(rows);
        info!("loaded {} trips from {count} rows", trips.len());
        self.replace(SelectionState::load_summarized(trips, summaries))
    }

    pub fn load_trips(&self, trips: Vec<Trip>) -> Arc<SelectionState> {
        self.replace(SelectionState::load_trips(trips))
    }

    /// Switch the active vehicle of whatever snapshot is current when the
    /// channel lock is taken, so a concurrent upload is never undone.
    pub fn select_vehicle(&self, vehicle_id: &str) -> Arc<SelectionState> {
        let mut next = Arc::default();
        self.state.send_modify(|state| {
            *state = Arc::new(state.select_vehicle(vehicle_id));
            next = state.clone();
        });
        info!("selected vehicle {vehicle_id:?}");
        next
    }

    fn replace(&self, next: SelectionState) -> Arc<SelectionState> {
        let next = Arc::new(next);
        self.state.send_replace(next.clone());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping(vehicle: &str, lat: &str) -> RawPing {
        RawPing {
            vehicle_id: Some(vehicle.to_owned()),
            latitude: Some(lat.to_owned()),
            longitude: Some("27241859".to_owned()),
            timestamp: Some("2024-03-01 10:00:00".to_owned()),
        }
    }

    #[test]
    fn upload_replaces_everything() {
        let session = Session::new();
        session.upload(Some(vec![ping("V1", "25677209"), ping("V2", "25677209")]));
        session.select_vehicle("V2");

        let state = session.upload(Some(vec![ping("V3", "25677209")]));
        assert_eq!(state.active_vehicle(), Some("V3"));
        assert_eq!(state.vehicles().collect::<Vec<_>>(), ["V3"]);
        assert_eq!(session.snapshot().summaries().len(), 1);
    }

    #[test]
    fn upload_without_rows_keeps_state() {
        let session = Session::new();
        session.upload(Some(vec![ping("V1", "25677209")]));
        let state = session.upload(None);
        assert_eq!(state.active_vehicle(), Some("V1"));
    }

    #[test]
    fn upload_with_only_invalid_rows_clears() {
        let session = Session::new();
        session.upload(Some(vec![ping("V1", "25677209")]));
        let state = session.upload(Some(vec![ping("", "25677209")]));
        assert!(state.is_empty());
        assert_eq!(state.active_vehicle(), None);
    }

    #[test]
    fn select_never_restores_replaced_trips() {
        for _ in 0..200 {
            let session = Session::new();
            session.upload(Some(vec![ping("OLD", "25677209")]));

            std::thread::scope(|s| {
                s.spawn(|| {
                    for _ in 0..20 {
                        session.select_vehicle("OLD");
                    }
                });
                s.spawn(|| {
                    session.upload(Some(vec![ping("NEW", "25677209")]));
                });
            });

            let state = session.snapshot();
            assert_eq!(state.vehicles().collect::<Vec<_>>(), ["NEW"]);
        }
    }

    #[test]
    fn select_keeps_trips() {
        let session = Session::new();
        session.upload(Some(vec![ping("V1", "25677209"), ping("V2", "25677209")]));
        let state = session.select_vehicle("V2");
        assert_eq!(state.active_vehicle(), Some("V2"));
        assert_eq!(state.vehicles().collect::<Vec<_>>(), ["V1", "V2"]);
        assert!(Arc::ptr_eq(&state, &session.snapshot()));
    }

    #[test]
    fn subscribers_see_transitions() {
        let session = Session::new();
        let mut rx = session.subscribe();
        assert!(!rx.has_changed().unwrap());

        session.load_trips(vec![Trip {
            vehicle_id: "V1".to_owned(),
            coordinates: Vec::new(),
        }]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().active_vehicle(), Some("V1"));

        session.select_vehicle("V1");
        assert!(rx.has_changed().unwrap());
    }
}
