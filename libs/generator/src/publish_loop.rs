use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use cluster_api::{ClusterPublisher, PublishError};

use crate::clock::Clock;
use crate::factory::ClusterFactory;

/// Пауза между публикациями.
pub const PUBLISH_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the tick: build a collection, publish it, wait, repeat.
///
/// Остановка только через `CancellationToken`. Токен проверяется в начале
/// каждого тика и после ожидания; само ожидание прерывается отменой, поэтому
/// выход не ждёт окончания интервала. Построение и публикация сообщения
/// отменой не прерываются.
pub struct PublishLoop {
    interval: Duration,
    token: CancellationToken,
}

impl PublishLoop {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            interval: PUBLISH_INTERVAL,
            token,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the token is cancelled. Returns the number of published
    /// messages; the first publish error ends the loop and is returned as is.
    pub async fn run<R, C, P>(
        &self,
        factory: &mut ClusterFactory<R, C>,
        publisher: &mut P,
    ) -> Result<u64, PublishError>
    where
        R: Rng,
        C: Clock,
        P: ClusterPublisher + ?Sized,
    {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "publish loop started");
        let mut published = 0u64;

        while !self.token.is_cancelled() {
            let collection = factory.make_collection();
            tracing::debug!(
                clusters = collection.clusters.len(),
                points = collection.point_count(),
                stamp_ms = collection.header.stamp_ms,
                "publishing"
            );
            publisher.publish(collection)?;
            published += 1;

            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(published, "publish loop stopped");
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Instant;

    use cluster_api::ClusterCollection;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::clock::SystemClock;
    use crate::factory::{CLUSTERS_PER_COLLECTION, POINTS_PER_CLUSTER};

    #[derive(Default)]
    struct Collect {
        received: Vec<ClusterCollection>,
    }

    impl ClusterPublisher for Collect {
        fn publish(&mut self, collection: ClusterCollection) -> Result<(), PublishError> {
            self.received.push(collection);
            Ok(())
        }
    }

    struct Broken;

    impl ClusterPublisher for Broken {
        fn publish(&mut self, _collection: ClusterCollection) -> Result<(), PublishError> {
            Err(PublishError::io("connection refused"))
        }
    }

    fn factory() -> ClusterFactory<StdRng, SystemClock> {
        ClusterFactory::new(StdRng::seed_from_u64(42), SystemClock::new())
    }

    #[tokio::test]
    async fn test_stopped_before_start_publishes_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let mut sink = Collect::default();

        let started = Instant::now();
        let published = PublishLoop::new(token)
            .run(&mut factory(), &mut sink)
            .await
            .unwrap();

        assert_eq!(published, 0);
        assert!(sink.received.is_empty());
        assert!(started.elapsed() < PUBLISH_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_ticks_then_stop() {
        let token = CancellationToken::new();
        let stopper = token.clone();
        tokio::spawn(async move {
            // Ticks at 0s, 1s, 2s; stop lands during the third wait.
            tokio::time::sleep(Duration::from_millis(2_500)).await;
            stopper.cancel();
        });

        let mut sink = Collect::default();
        let published = PublishLoop::new(token)
            .run(&mut factory(), &mut sink)
            .await
            .unwrap();

        assert_eq!(published, 3);
        assert_eq!(sink.received.len(), 3);
        for msg in &sink.received {
            assert!(CLUSTERS_PER_COLLECTION.contains(&msg.clusters.len()));
            for field in &msg.clusters {
                assert!(POINTS_PER_CLUSTER.contains(&field.points.len()));
            }
        }
        for pair in sink.received.windows(2) {
            assert!(pair[0].header.stamp_ms <= pair[1].header.stamp_ms);
        }
    }

    #[tokio::test]
    async fn test_cancel_interrupts_wait() {
        let token = CancellationToken::new();
        let stopper = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        let mut sink = Collect::default();
        let publish_loop = PublishLoop::new(token).with_interval(Duration::from_secs(60));
        let mut factory = factory();

        let started = Instant::now();
        let published = tokio::time::timeout(
            Duration::from_secs(5),
            publish_loop.run(&mut factory, &mut sink),
        )
        .await
        .expect("loop did not observe cancellation")
        .unwrap();

        assert_eq!(published, 1);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_publish_error_propagates() {
        let token = CancellationToken::new();
        let err = PublishLoop::new(token)
            .run(&mut factory(), &mut Broken)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), cluster_api::ErrorKind::Io);
        assert_eq!(err.message(), "connection refused");
    }

    #[tokio::test]
    async fn test_runs_through_boxed_publisher() {
        let token = CancellationToken::new();
        token.cancel();
        let mut sink: Box<dyn ClusterPublisher> = Box::new(Collect::default());

        let published = PublishLoop::new(token)
            .run(&mut factory(), &mut sink)
            .await
            .unwrap();
        assert_eq!(published, 0);
    }

    #[test]
    fn test_default_interval() {
        let publish_loop = PublishLoop::new(CancellationToken::new());
        assert_eq!(publish_loop.interval, Duration::from_secs(1));
    }
}
