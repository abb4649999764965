pub mod config;
pub mod error;
mod endpoint;
mod framing;
mod memory;
mod sink;
mod transport;

pub use error::PipelineError;
pub use endpoint::Endpoint;
pub use framing::{Framing, LengthPrefixedFraming, LinesFraming};
pub use memory::MemorySink;
pub use sink::{FanOut, SinkPipeline, load_pipelines};
pub use transport::{FileTransport, StdoutTransport, TcpClientTransport, Transport, TransportStream};
