use cluster_api::{ChannelRecord, ClusterCollection, ClusterPublisher, PublishError};

/// In-memory publisher: keeps every record it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    channel: String,
    records: Vec<ChannelRecord>,
}

impl MemorySink {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ChannelRecord> {
        self.records
    }
}

impl ClusterPublisher for MemorySink {
    fn publish(&mut self, collection: ClusterCollection) -> Result<(), PublishError> {
        self.records.push(ChannelRecord::new(self.channel.clone(), collection));
        Ok(())
    }
}
