//! Random cluster synthesis and the timed publish loop.
//!
//! ```text
//! PublishLoop ──tick──▶ ClusterFactory ──ClusterCollection──▶ ClusterPublisher
//!      ▲                                                         (sink)
//!      └──────── sleep(interval) | token.cancelled() ◀──────────────┘
//! ```

pub mod clock;
pub mod factory;
pub mod publish_loop;

pub use clock::{Clock, SystemClock};
pub use factory::ClusterFactory;
pub use publish_loop::{PublishLoop, PUBLISH_INTERVAL};

/// Канал, в который публикуются сообщения генератора.
pub const CHANNEL: &str = "test_cluster";
