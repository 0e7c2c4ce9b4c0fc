//! Single-flight guard over page indices.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Tracks which page indices have a request outstanding.
///
/// At most one request per page index may be in flight within a cache scope.
/// A caller that cannot acquire a page skips it; there is no queueing.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<Mutex<HashSet<u32>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn pages(&self) -> MutexGuard<'_, HashSet<u32>> {
        // The set stays consistent even if a holder panicked
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark `page` as in flight. Returns false if it already was.
    pub fn try_acquire(&self, page: u32) -> bool {
        self.pages().insert(page)
    }

    /// Clear the in-flight mark for `page`, whether or not it was set.
    pub fn release(&self, page: u32) {
        self.pages().remove(&page);
    }

    pub fn is_in_flight(&self, page: u32) -> bool {
        self.pages().contains(&page)
    }

    pub fn in_flight_count(&self) -> usize {
        self.pages().len()
    }

    /// Acquire `page` and return a permit that releases it on drop.
    ///
    /// The permit releases on success, error, and when the owning future is
    /// dropped mid-request.
    pub fn permit(&self, page: u32) -> Option<FlightPermit> {
        if self.try_acquire(page) {
            Some(FlightPermit {
                flights: self.clone(),
                page,
            })
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct FlightPermit {
    flights: SingleFlight,
    page: u32,
}

impl FlightPermit {
    pub fn page(&self) -> u32 {
        self.page
    }
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.flights.release(self.page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_acquire_and_release() {
        let flights = SingleFlight::new();
        assert!(flights.try_acquire(2));
        assert!(!flights.try_acquire(2));
        assert!(flights.try_acquire(3));
        assert_eq!(flights.in_flight_count(), 2);

        flights.release(2);
        assert!(!flights.is_in_flight(2));
        assert!(flights.try_acquire(2));
    }

    #[test]
    fn test_release_is_unconditional() {
        let flights = SingleFlight::new();
        flights.release(7);
        assert_eq!(flights.in_flight_count(), 0);
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let flights = SingleFlight::new();
        let permit = flights.permit(4).unwrap();
        assert_eq!(permit.page(), 4);
        assert!(flights.permit(4).is_none());
        drop(permit);
        assert!(flights.permit(4).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let a = SingleFlight::new();
        let b = a.clone();
        assert!(a.try_acquire(1));
        assert!(!b.try_acquire(1));
    }

    #[tokio::test]
    async fn test_permit_released_when_future_is_aborted() {
        let flights = SingleFlight::new();
        let held = flights.clone();
        let task = tokio::spawn(async move {
            let _permit = held.permit(9);
            std::future::pending::<()>().await;
        });
        while !flights.is_in_flight(9) {
            tokio::task::yield_now().await;
        }
        task.abort();
        let _ = task.await;
        assert!(!flights.is_in_flight(9));
    }
}
