use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use problemkit::{LoggingConfig, TranslatorConfig};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `PROBLEMKIT__PROBLEMS__VERBOSE=true`.
pub const ENV_PREFIX: &str = "PROBLEMKIT__";

const DEFAULT_PORT: u16 = 8087;

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Effective server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub problems: TranslatorConfig,
}

impl ServerConfig {
    /// Layered load: defaults, then the YAML file (if any), then `PROBLEMKIT__*` env.
    ///
    /// # Errors
    /// Returns the figment error when a layer does not parse or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path).extract().map_err(Box::new)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// CLI flags win over every other layer.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose_errors: bool) {
        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
        }
        if verbose_errors {
            self.problems.verbose = true;
        }
    }

    /// Pretty JSON rendering for `--print-config` and `check`.
    ///
    /// # Errors
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_file() {
        let cfg = ServerConfig::load(None).unwrap();
        assert_eq!(cfg.server.bind_addr.port(), DEFAULT_PORT);
        assert!(!cfg.problems.verbose);
        assert_eq!(cfg.problems.response_id_header.as_deref(), Some("x-request-id"));
    }

    #[test]
    fn yaml_then_env_then_cli() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "server.yaml",
                r"
server:
  bind_addr: 0.0.0.0:9000
logging:
  level: warn
problems:
  correlation_id_len: 12
",
            )?;
            jail.set_env("PROBLEMKIT__LOGGING__JSON", "true");

            let mut cfg = ServerConfig::load(Some(Path::new("server.yaml"))).map_err(|e| *e)?;
            assert_eq!(cfg.server.bind_addr.port(), 9000);
            assert_eq!(cfg.logging.level, "warn");
            assert!(cfg.logging.json);
            assert_eq!(cfg.problems.correlation_id_len, 12);

            cfg.apply_cli_overrides(Some(9100), true);
            assert_eq!(cfg.server.bind_addr.port(), 9100);
            assert!(cfg.problems.verbose);
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "problems:\n  verbos: true\n")?;
            assert!(ServerConfig::load(Some(Path::new("bad.yaml"))).is_err());
            Ok(())
        });
    }
}
