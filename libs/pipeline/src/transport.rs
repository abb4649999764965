use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::TcpStream;

use serde::Deserialize;

use cluster_api::PublishError;

use crate::config::parse_config;

/// Байтовый поток, в который sink пишет фреймы.
pub trait TransportStream: Write + Send {
    /// Описание удалённой стороны для логов.
    fn peer_info(&self) -> String {
        "unknown".to_string()
    }
}

impl TransportStream for TcpStream {
    fn peer_info(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

impl TransportStream for std::io::Stdout {
    fn peer_info(&self) -> String {
        "stdout".to_string()
    }
}

impl TransportStream for File {}

/// Outbound connection factory.
///
/// `next_connection` вызывается при первой отправке и повторно после ошибки
/// записи. `Ok(None)` означает, что транспорт закрыт.
pub trait Transport: Send {
    fn start(&mut self) -> Result<(), PublishError>;

    fn next_connection(&mut self) -> Result<Option<Box<dyn TransportStream>>, PublishError>;

    fn stop(&mut self) -> Result<(), PublishError>;
}

/// Построить transport по имени из конфига sink'а.
pub(crate) fn load_transport(name: &str, config: &Option<toml::Value>) -> Result<Box<dyn Transport>, PublishError> {
    match name {
        "stdout" => Ok(Box::new(StdoutTransport)),
        "tcp-client" => {
            let cfg: TcpClientConfig = parse_config(config)?;
            Ok(Box::new(TcpClientTransport::new(format!("{}:{}", cfg.host, cfg.port))))
        }
        "file" => {
            let cfg: FileConfig = parse_config(config)?;
            Ok(Box::new(FileTransport::new(cfg.path)))
        }
        other => Err(PublishError::config(format!(
            "unknown transport {other:?} (expected \"stdout\", \"tcp-client\" or \"file\")"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════
//  stdout
// ═══════════════════════════════════════════════════════════════

pub struct StdoutTransport;

impl Transport for StdoutTransport {
    fn start(&mut self) -> Result<(), PublishError> {
        Ok(())
    }

    fn next_connection(&mut self) -> Result<Option<Box<dyn TransportStream>>, PublishError> {
        Ok(Some(Box::new(std::io::stdout())))
    }

    fn stop(&mut self) -> Result<(), PublishError> {
        std::io::stdout().flush()?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  tcp-client
// ═══════════════════════════════════════════════════════════════

/// Исходящее TCP-соединение. Каждый вызов `next_connection` открывает
/// новое соединение, так что sink переподключается после обрыва.
pub struct TcpClientTransport {
    addr: String,
}

impl TcpClientTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Transport for TcpClientTransport {
    fn start(&mut self) -> Result<(), PublishError> {
        Ok(())
    }

    fn next_connection(&mut self) -> Result<Option<Box<dyn TransportStream>>, PublishError> {
        let stream = TcpStream::connect(&self.addr)
            .map_err(|e| PublishError::io(format!("TCP connect to {}: {e}", self.addr)))?;
        stream.set_nodelay(true)?;
        tracing::info!(addr = %self.addr, "tcp-client connected");
        Ok(Some(Box::new(stream)))
    }

    fn stop(&mut self) -> Result<(), PublishError> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct TcpClientConfig {
    host: String,
    port: u16,
}

// ═══════════════════════════════════════════════════════════════
//  file
// ═══════════════════════════════════════════════════════════════

/// Дозапись в файл; файл создаётся, если его нет.
pub struct FileTransport {
    path: String,
}

impl FileTransport {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Transport for FileTransport {
    fn start(&mut self) -> Result<(), PublishError> {
        Ok(())
    }

    fn next_connection(&mut self) -> Result<Option<Box<dyn TransportStream>>, PublishError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PublishError::io(format!("cannot open {}: {e}", self.path)))?;
        Ok(Some(Box::new(file)))
    }

    fn stop(&mut self) -> Result<(), PublishError> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct FileConfig {
    path: String,
}
