use std::io::Write;

use cluster_api::{ChannelRecord, ClusterCollection, ClusterPublisher, PublishError};

use crate::PipelineError;
use crate::config::SinkConfig;
use crate::endpoint::Endpoint;
use crate::transport::TransportStream;

// ═══════════════════════════════════════════════════════════════
//  Sink pipeline (Endpoint wrapper with connection management)
// ═══════════════════════════════════════════════════════════════

pub struct SinkPipeline {
    pub endpoint: Endpoint,
    stream: Option<Box<dyn TransportStream>>,
    buf: Vec<u8>,
}

/// Неудачная отправка кадра. `partial`: часть байт кадра уже ушла в поток.
struct SendFailure {
    error: PublishError,
    partial: bool,
}

impl SendFailure {
    fn clean(error: PublishError) -> Self {
        Self { error, partial: false }
    }
}

impl SinkPipeline {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            stream: None,
            buf: Vec::with_capacity(8192),
        }
    }

    pub fn name(&self) -> &str {
        &self.endpoint.name
    }

    /// Start the transport and open the first connection.
    pub fn start(&mut self) -> Result<(), PublishError> {
        self.endpoint.transport.start()?;
        self.ensure_connected()?;
        let peer = self.stream.as_ref().map(|s| s.peer_info()).unwrap_or_default();
        tracing::info!(sink = %self.name(), %peer, "connected");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), PublishError> {
        if let Some(mut stream) = self.stream.take() {
            stream.flush()?;
        }
        self.endpoint.transport.stop()
    }

    fn ensure_connected(&mut self) -> Result<(), PublishError> {
        if self.stream.is_none() {
            let stream = self
                .endpoint
                .transport
                .next_connection()?
                .ok_or_else(|| PublishError::io(format!("[{}] transport closed", self.endpoint.name)))?;
            self.stream = Some(stream);
        }
        Ok(())
    }

    pub fn send(&mut self, record: &ChannelRecord) -> Result<(), PublishError> {
        self.try_send(record).map_err(|f| f.error)
    }

    fn try_send(&mut self, record: &ChannelRecord) -> Result<(), SendFailure> {
        self.buf.clear();
        self.endpoint
            .encode_to_wire(record, &mut self.buf)
            .map_err(SendFailure::clean)?;
        self.ensure_connected().map_err(SendFailure::clean)?;
        let stream = self.stream.as_mut().ok_or_else(|| {
            SendFailure::clean(PublishError::io(format!("[{}] not connected", self.endpoint.name)))
        })?;

        // write_all не сообщает, сколько байт ушло до ошибки
        let mut written = 0;
        while written < self.buf.len() {
            match stream.write(&self.buf[written..]) {
                Ok(0) => {
                    return Err(SendFailure {
                        error: std::io::Error::from(std::io::ErrorKind::WriteZero).into(),
                        partial: written > 0,
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(SendFailure {
                        error: e.into(),
                        partial: written > 0,
                    });
                }
            }
        }
        stream.flush().map_err(|e| SendFailure {
            error: e.into(),
            partial: true,
        })
    }

    /// `send`, а при ошибке ввода-вывода до первого записанного байта
    /// переподключиться и повторить один раз. Если кадр ушёл частично,
    /// повтор склеил бы его с полной копией, поэтому ошибка возвращается
    /// сразу. Ошибки кодирования не повторяются.
    pub fn send_reconnect(&mut self, record: &ChannelRecord) -> Result<(), PublishError> {
        match self.try_send(record) {
            Ok(()) => Ok(()),
            Err(f) if f.error.kind() != cluster_api::ErrorKind::Io => Err(f.error),
            Err(f) if f.partial => {
                tracing::warn!(sink = %self.endpoint.name, error = ?f.error, "frame partially written, not retrying");
                self.stream = None;
                Err(f.error)
            }
            Err(f) => {
                tracing::warn!(sink = %self.endpoint.name, error = ?f.error, "send error, reconnecting");
                self.stream = None;
                let result = self.send(record);
                if result.is_err() {
                    self.stream = None;
                }
                result
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Fan-out over all configured sinks
// ═══════════════════════════════════════════════════════════════

/// Отправляет каждое сообщение во все sink'и по порядку.
/// Первая ошибка прерывает отправку и возвращается вызывающему.
pub struct FanOut {
    channel: String,
    sinks: Vec<SinkPipeline>,
}

impl FanOut {
    pub fn new(channel: impl Into<String>, sinks: Vec<SinkPipeline>) -> Self {
        Self {
            channel: channel.into(),
            sinks,
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn start(&mut self) -> Result<(), PublishError> {
        for sink in &mut self.sinks {
            sink.start()?;
        }
        Ok(())
    }

    /// Stop every sink, logging failures instead of returning early.
    pub fn stop(&mut self) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.stop() {
                tracing::warn!(sink = %sink.name(), error = ?e, "stop error");
            }
        }
    }
}

impl ClusterPublisher for FanOut {
    fn publish(&mut self, collection: ClusterCollection) -> Result<(), PublishError> {
        let record = ChannelRecord::new(self.channel.clone(), collection);
        for sink in &mut self.sinks {
            sink.send_reconnect(&record)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Load sink pipelines from config
// ═══════════════════════════════════════════════════════════════

pub fn load_pipelines(sinks: &[SinkConfig], channel: &str) -> Result<FanOut, PipelineError> {
    let mut pipelines = Vec::with_capacity(sinks.len());

    for sink_cfg in sinks {
        let endpoint = Endpoint::load(sink_cfg).map_err(|e| PipelineError::Config {
            sink: sink_cfg.name.clone(),
            detail: e.to_string(),
        })?;
        pipelines.push(SinkPipeline::new(endpoint));
    }

    Ok(FanOut::new(channel, pipelines))
}
