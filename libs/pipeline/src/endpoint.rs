use cluster_api::{ChannelRecord, PublishError};

use crate::config::SinkConfig;
use crate::framing::{Framing, load_framing};
use crate::transport::{Transport, load_transport};

// ═══════════════════════════════════════════════════════════════
//  Endpoint
// ═══════════════════════════════════════════════════════════════

/// Унифицированный endpoint: transport + framing, кодек JSON.
pub struct Endpoint {
    pub name: String,
    pub transport: Box<dyn Transport>,
    pub framing: Box<dyn Framing>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, transport: Box<dyn Transport>, framing: Box<dyn Framing>) -> Self {
        Self {
            name: name.into(),
            transport,
            framing,
        }
    }

    /// Build transport and framing from a `[[sinks]]` entry.
    pub fn load(cfg: &SinkConfig) -> Result<Self, PublishError> {
        let transport = load_transport(&cfg.transport, &cfg.transport_config)?;
        let framing = load_framing(&cfg.framing, &cfg.framing_config)?;

        tracing::info!(
            endpoint = %cfg.name,
            transport = %cfg.transport,
            framing = %cfg.framing,
            "loaded endpoint"
        );

        Ok(Self::new(cfg.name.clone(), transport, framing))
    }

    /// Encode: ChannelRecord → wire bytes appended to `out`.
    ///
    /// Pipeline: serde_json → framing.encode()
    pub fn encode_to_wire(&self, record: &ChannelRecord, out: &mut Vec<u8>) -> Result<(), PublishError> {
        let data = serde_json::to_vec(record)?;
        self.framing.encode(&data, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster_api::{ClusterCollection, ClusterField, Header, Point3};

    fn record() -> ChannelRecord {
        ChannelRecord::new(
            "test_cluster",
            ClusterCollection {
                header: Header { frame_id: "/base_link".into(), stamp_ms: 5 },
                clusters: vec![ClusterField {
                    name: "Cluster 0".into(),
                    points: vec![Point3 { x: 1.5, y: 2.0, z: -3.0 }],
                }],
            },
        )
    }

    #[test]
    fn test_encode_lines_is_one_json_line() {
        let endpoint = Endpoint::load(&SinkConfig::stdout()).unwrap();
        let mut out = Vec::new();
        endpoint.encode_to_wire(&record(), &mut out).unwrap();

        assert_eq!(out.last(), Some(&b'\n'));
        assert_eq!(out.iter().filter(|b| **b == b'\n').count(), 1);

        let decoded: ChannelRecord = serde_json::from_slice(&out[..out.len() - 1]).unwrap();
        assert_eq!(decoded, record());
    }

    #[test]
    fn test_load_rejects_unknown_transport() {
        let mut cfg = SinkConfig::stdout();
        cfg.transport = "carrier-pigeon".into();
        assert!(Endpoint::load(&cfg).is_err());
    }
}
