use serde::Deserialize;

use cluster_api::PublishError;

use crate::config::parse_config;

/// Разделение сообщений в байтовом потоке транспорта.
pub trait Framing: Send + Sync {
    /// Дописать в `buf` один фрейм с payload `data`.
    fn encode(&self, data: &[u8], buf: &mut Vec<u8>) -> Result<(), PublishError>;
}

/// Построить framing по имени из конфига sink'а.
pub(crate) fn load_framing(name: &str, config: &Option<toml::Value>) -> Result<Box<dyn Framing>, PublishError> {
    match name {
        "lines" => {
            let cfg: LinesConfig = parse_config(config)?;
            Ok(Box::new(LinesFraming::new(cfg.max_length)))
        }
        "length-prefixed" => {
            let cfg: LengthPrefixedConfig = parse_config(config)?;
            Ok(Box::new(LengthPrefixedFraming::from_config(cfg)?))
        }
        other => Err(PublishError::config(format!(
            "unknown framing {other:?} (expected \"lines\" or \"length-prefixed\")"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Lines
// ═══════════════════════════════════════════════════════════════

/// Payload + `\n`. JSON из serde_json не содержит переводов строк,
/// поэтому экранирование не нужно.
pub struct LinesFraming {
    max_length: usize,
}

impl LinesFraming {
    /// `max_length` в байтах, 0 = без ограничения.
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Framing for LinesFraming {
    fn encode(&self, data: &[u8], buf: &mut Vec<u8>) -> Result<(), PublishError> {
        if self.max_length > 0 && data.len() > self.max_length {
            return Err(PublishError::format_err(format!(
                "line too long: {} bytes (max {})",
                data.len(),
                self.max_length
            )));
        }
        buf.extend_from_slice(data);
        buf.push(b'\n');
        Ok(())
    }
}

#[derive(Default, Deserialize)]
struct LinesConfig {
    /// Максимальная длина строки в байтах (0 = без ограничения).
    #[serde(default)]
    max_length: usize,
}

// ═══════════════════════════════════════════════════════════════
//  Length-prefixed
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

/// Заголовок длины (1, 2 или 4 байта) + payload.
pub struct LengthPrefixedFraming {
    length_bytes: usize,
    byte_order: ByteOrder,
    max_payload: usize,
}

impl LengthPrefixedFraming {
    fn from_config(cfg: LengthPrefixedConfig) -> Result<Self, PublishError> {
        if !matches!(cfg.length_bytes, 1 | 2 | 4) {
            return Err(PublishError::config(format!(
                "length_bytes must be 1, 2, or 4, got {}",
                cfg.length_bytes
            )));
        }

        let byte_order = match cfg.byte_order.as_str() {
            "big" | "be" => ByteOrder::Big,
            "little" | "le" => ByteOrder::Little,
            other => {
                return Err(PublishError::config(format!(
                    "byte_order must be \"big\" or \"little\", got {other:?}"
                )));
            }
        };

        Ok(Self {
            length_bytes: cfg.length_bytes,
            byte_order,
            max_payload: cfg.max_payload,
        })
    }
}

impl Framing for LengthPrefixedFraming {
    fn encode(&self, data: &[u8], buf: &mut Vec<u8>) -> Result<(), PublishError> {
        let len = data.len();
        if self.max_payload > 0 && len > self.max_payload {
            return Err(PublishError::format_err(format!(
                "payload too large: {len} bytes (max {})",
                self.max_payload
            )));
        }

        match (self.length_bytes, self.byte_order) {
            (1, _) => {
                let n = u8::try_from(len)
                    .map_err(|_| PublishError::format_err(format!("payload too large for 1-byte header: {len}")))?;
                buf.push(n);
            }
            (2, order) => {
                let n = u16::try_from(len)
                    .map_err(|_| PublishError::format_err(format!("payload too large for 2-byte header: {len}")))?;
                match order {
                    ByteOrder::Big => buf.extend_from_slice(&n.to_be_bytes()),
                    ByteOrder::Little => buf.extend_from_slice(&n.to_le_bytes()),
                }
            }
            (4, order) => {
                let n = u32::try_from(len)
                    .map_err(|_| PublishError::format_err(format!("payload too large for 4-byte header: {len}")))?;
                match order {
                    ByteOrder::Big => buf.extend_from_slice(&n.to_be_bytes()),
                    ByteOrder::Little => buf.extend_from_slice(&n.to_le_bytes()),
                }
            }
            (n, _) => return Err(PublishError::config(format!("unsupported length_bytes: {n}"))),
        }
        buf.extend_from_slice(data);
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct LengthPrefixedConfig {
    /// Размер заголовка длины в байтах: 1, 2 или 4 (по умолчанию 4).
    length_bytes: usize,

    /// Порядок байтов: "big" (по умолчанию) или "little".
    byte_order: String,

    /// Максимальный размер payload в байтах (0 = без ограничения).
    max_payload: usize,
}

impl Default for LengthPrefixedConfig {
    fn default() -> Self {
        Self {
            length_bytes: 4,
            byte_order: "big".to_string(),
            max_payload: 0,
        }
    }
}
