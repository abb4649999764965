use clap::Args;
use serde::Deserialize;

use pipeline::config::SinkConfig;

use super::error::ClusterGenError;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub seed: Option<u64>,
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

pub fn load_config(path: &str) -> Result<Config, ClusterGenError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ClusterGenError::Config(format!("cannot read config {path}: {e}")))?;
    parse_config(&content).map_err(|e| ClusterGenError::Config(format!("bad config {path}: {e}")))
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct GenArgs {
    /// Путь к config.toml
    #[arg(long, default_value = "cluster-gen.toml", env = "CLUSTER_GEN_CONFIG")]
    pub config: String,

    /// Seed для PRNG (без указания: энтропия ОС)
    #[arg(long, env = "CLUSTER_GEN_SEED")]
    pub seed: Option<u64>,
}

// ═══════════════════════════════════════════════════════════════
//  Effective: merged config
// ═══════════════════════════════════════════════════════════════

/// Итоговая конфигурация после мержа: config.toml < env/CLI
#[derive(Debug)]
pub struct Effective {
    pub seed: Option<u64>,
    pub sinks: Vec<SinkConfig>,
}

impl Effective {
    pub fn new(args: &GenArgs) -> Result<Self, ClusterGenError> {
        let cfg = match load_config(&args.config) {
            Ok(c) => c,
            Err(e) => {
                if std::path::Path::new(&args.config).exists() {
                    return Err(e);
                }
                Config::default()
            }
        };

        Ok(Self::merge(args, cfg))
    }

    fn merge(args: &GenArgs, cfg: Config) -> Self {
        let sinks = if cfg.sinks.is_empty() {
            vec![SinkConfig::stdout()]
        } else {
            cfg.sinks
        };

        Self {
            seed: args.seed.or(cfg.seed),
            sinks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(seed: Option<u64>) -> GenArgs {
        GenArgs {
            config: "does-not-exist.toml".into(),
            seed,
        }
    }

    #[test]
    fn test_missing_config_falls_back_to_stdout() {
        let eff = Effective::new(&args(None)).unwrap();
        assert_eq!(eff.seed, None);
        assert_eq!(eff.sinks.len(), 1);
        assert_eq!(eff.sinks[0].transport, "stdout");
        assert_eq!(eff.sinks[0].framing, "lines");
    }

    #[test]
    fn test_cli_seed_overrides_file() {
        let cfg = parse_config("seed = 7").unwrap();
        let eff = Effective::merge(&args(Some(42)), cfg);
        assert_eq!(eff.seed, Some(42));

        let cfg = parse_config("seed = 7").unwrap();
        let eff = Effective::merge(&args(None), cfg);
        assert_eq!(eff.seed, Some(7));
    }

    #[test]
    fn test_configured_sinks_are_kept() {
        let cfg = parse_config(
            r#"
            [[sinks]]
            name = "viewer"
            transport = "tcp-client"
            transport_config = { host = "127.0.0.1", port = 9400 }
            framing = "length-prefixed"

            [[sinks]]
            name = "log"
            transport = "file"
            transport_config = { path = "clusters.jsonl" }
            "#,
        )
        .unwrap();

        let eff = Effective::merge(&args(None), cfg);
        let names: Vec<&str> = eff.sinks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["viewer", "log"]);
        assert_eq!(eff.sinks[0].framing, "length-prefixed");
        assert_eq!(eff.sinks[1].framing, "lines");
    }

    #[test]
    fn test_broken_existing_config_is_an_error() {
        let path = std::env::temp_dir().join(format!("cluster-gen-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "seed = \"not a number\"").unwrap();

        let result = Effective::new(&GenArgs {
            config: path.to_string_lossy().into_owned(),
            seed: None,
        });
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ClusterGenError::Config(_))));
    }
}
