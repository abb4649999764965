use tokio_util::sync::CancellationToken;

use cluster_api::ClusterPublisher;
use cluster_generator::{CHANNEL, ClusterFactory, PublishLoop};
use pipeline::load_pipelines;

use super::config::Effective;
use super::error::ClusterGenError;

// ═══════════════════════════════════════════════════════════════
//  Main dispatch
// ═══════════════════════════════════════════════════════════════

pub async fn run(args: &Effective) -> Result<(), ClusterGenError> {
    let mut sinks = load_pipelines(&args.sinks, CHANNEL)?;
    sinks.start()?;

    let token = CancellationToken::new();
    spawn_ctrl_c(token.clone());

    tracing::info!(
        channel = CHANNEL,
        sinks = %sinks.names().join(", "),
        seed = ?args.seed,
        "cluster test started, sending cluster points"
    );

    let mut factory = ClusterFactory::from_seed(args.seed);
    let result = publish(&PublishLoop::new(token), &mut factory, &mut sinks).await;
    sinks.stop();
    result
}

async fn publish<P: ClusterPublisher>(
    publish_loop: &PublishLoop,
    factory: &mut ClusterFactory,
    publisher: &mut P,
) -> Result<(), ClusterGenError> {
    let published = publish_loop.run(factory, publisher).await?;
    tracing::info!(published, "shutdown complete");
    Ok(())
}

/// Ctrl+C отменяет токен; цикл публикации завершается штатно.
fn spawn_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("shutting down..."),
            Err(e) => tracing::error!(error = %e, "cannot listen for ctrl-c, stopping"),
        }
        token.cancel();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use cluster_api::ClusterCollection;
    use pipeline::MemorySink;

    /// Cancels the token after `limit` messages.
    struct StopAfter {
        inner: MemorySink,
        limit: usize,
        token: CancellationToken,
    }

    impl ClusterPublisher for StopAfter {
        fn publish(&mut self, collection: ClusterCollection) -> Result<(), cluster_api::PublishError> {
            self.inner.publish(collection)?;
            if self.inner.len() >= self.limit {
                self.token.cancel();
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_stops_after_cancellation() {
        let token = CancellationToken::new();
        let mut sink = StopAfter {
            inner: MemorySink::new(CHANNEL),
            limit: 4,
            token: token.clone(),
        };
        let mut factory = ClusterFactory::from_seed(Some(42));
        let publish_loop = PublishLoop::new(token).with_interval(Duration::from_millis(10));

        publish(&publish_loop, &mut factory, &mut sink).await.unwrap();

        let records = sink.inner.into_records();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.channel == "test_cluster"));
        assert!(records.iter().all(|r| r.value.header.frame_id == "/base_link"));
    }

    #[tokio::test]
    async fn test_run_rejects_unknown_sink() {
        let eff = Effective {
            seed: Some(1),
            sinks: vec![pipeline::config::SinkConfig {
                name: "bad".into(),
                transport: "smoke-signals".into(),
                transport_config: None,
                framing: "lines".into(),
                framing_config: None,
            }],
        };

        let err = run(&eff).await.unwrap_err();
        assert!(matches!(err, ClusterGenError::Pipeline(_)));
        assert!(err.to_string().contains("bad"));
    }
}
