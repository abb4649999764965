use serde::Deserialize;
use serde::de::DeserializeOwned;

use cluster_api::PublishError;

// ═══════════════════════════════════════════════════════════════
//  Sink Config
// ═══════════════════════════════════════════════════════════════

/// Конфигурация одного sink'а: transport + framing.
///
/// Кодек всегда JSON: записи канала сериализуются через serde_json.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_sink_name")]
    pub name: String,
    /// "stdout", "tcp-client" или "file".
    pub transport: String,
    pub transport_config: Option<toml::Value>,
    /// "lines" или "length-prefixed".
    #[serde(default = "default_framing")]
    pub framing: String,
    pub framing_config: Option<toml::Value>,
}

impl SinkConfig {
    /// Sink по умолчанию, если в конфиге нет ни одного `[[sinks]]`.
    pub fn stdout() -> Self {
        Self {
            name: "stdout".into(),
            transport: "stdout".into(),
            transport_config: None,
            framing: default_framing(),
            framing_config: None,
        }
    }
}

fn default_sink_name() -> String {
    "unnamed".into()
}

fn default_framing() -> String {
    "lines".into()
}

// ═══════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════

/// Разобрать `*_config` секцию в типизированную структуру.
/// Отсутствующая секция трактуется как пустая таблица.
pub(crate) fn parse_config<T: DeserializeOwned>(val: &Option<toml::Value>) -> Result<T, PublishError> {
    let json = match val {
        Some(v) => serde_json::to_value(v)?,
        None => serde_json::Value::Object(Default::default()),
    };
    serde_json::from_value(json).map_err(|e| PublishError::config(e.to_string()))
}
