//! Synthetic cluster messages built from randomness alone.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cluster_api::{ClusterCollection, ClusterField, Header, Point3};

use crate::clock::{Clock, SystemClock};

/// Coordinate frame of every generated message.
pub const FRAME_ID: &str = "/base_link";

pub const COORD_MIN: f64 = -10.0;
pub const COORD_MAX: f64 = 10.0;

/// Число точек в одном кластере (включительно).
pub const POINTS_PER_CLUSTER: RangeInclusive<usize> = 1..=100;

/// Число кластеров в одном сообщении (включительно).
pub const CLUSTERS_PER_COLLECTION: RangeInclusive<usize> = 1..=20;

/// Generates `ClusterCollection` values.
///
/// Each call is independent of the previous ones; the only state is the
/// RNG handle and the clock, both injected so tests can pin them.
pub struct ClusterFactory<R = StdRng, C = SystemClock> {
    rng: R,
    clock: C,
}

impl ClusterFactory {
    /// Seeded `StdRng` when `seed` is set, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng, SystemClock::new())
    }
}

impl<R: Rng, C: Clock> ClusterFactory<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    pub fn make_point(&mut self) -> Point3 {
        Point3 {
            x: self.rng.random_range(COORD_MIN..=COORD_MAX),
            y: self.rng.random_range(COORD_MIN..=COORD_MAX),
            z: self.rng.random_range(COORD_MIN..=COORD_MAX),
        }
    }

    pub fn make_field(&mut self, index: usize) -> ClusterField {
        let count = self.rng.random_range(POINTS_PER_CLUSTER);
        let points = (0..count).map(|_| self.make_point()).collect();
        ClusterField {
            name: format!("Cluster {index}"),
            points,
        }
    }

    pub fn make_collection(&mut self) -> ClusterCollection {
        let header = Header {
            frame_id: FRAME_ID.to_string(),
            stamp_ms: self.clock.now_ms(),
        };
        let count = self.rng.random_range(CLUSTERS_PER_COLLECTION);
        let clusters = (0..count).map(|i| self.make_field(i)).collect();
        ClusterCollection { header, clusters }
    }
}
