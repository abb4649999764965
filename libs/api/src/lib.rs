//! Shared types for the cluster generator workspace.
//!
//! Содержит модель сообщения (`ClusterCollection`), конверт для канала
//! (`ChannelRecord`), единый тип ошибки и трейт публикации. Крейт не знает
//! ни про tokio, ни про конкретные транспорты.

mod error;
mod publish;
mod types;
mod util;

pub use error::{ErrorKind, PublishError};
pub use publish::ClusterPublisher;
pub use types::{ChannelRecord, ClusterCollection, ClusterField, Header, Point3};
pub use util::now_ms;
