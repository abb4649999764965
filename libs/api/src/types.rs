use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Cluster message
// ════════════════════════════════════════════════════════════════

/// Точка в трёхмерном пространстве фрейма сообщения.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Именованная группа точек. Имя не обязано быть уникальным в пределах
/// сообщения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterField {
    pub name: String,
    pub points: Vec<Point3>,
}

/// Coordinate frame and capture time of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub frame_id: String,
    /// Timestamp в миллисекундах (Unix epoch).
    pub stamp_ms: i64,
}

/// Top-level message emitted once per tick.
///
/// Создаётся заново на каждом тике и передаётся publisher'у по значению:
/// генератор не хранит ссылок на уже опубликованные сообщения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCollection {
    pub header: Header,
    pub clusters: Vec<ClusterField>,
}

impl ClusterCollection {
    /// Total number of points across all clusters.
    pub fn point_count(&self) -> usize {
        self.clusters.iter().map(|c| c.points.len()).sum()
    }
}

// ════════════════════════════════════════════════════════════════
//  Channel envelope
// ════════════════════════════════════════════════════════════════

/// Запись в канале: то, что sink сериализует и отправляет в транспорт.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Имя канала (topic), например `test_cluster`.
    pub channel: String,
    /// Timestamp в миллисекундах, совпадает с `value.header.stamp_ms`.
    pub ts_ms: i64,
    pub value: ClusterCollection,
}

impl ChannelRecord {
    pub fn new(channel: impl Into<String>, value: ClusterCollection) -> Self {
        Self {
            channel: channel.into(),
            ts_ms: value.header.stamp_ms,
            value,
        }
    }
}
