// ABOUTME: Pipeline definition structures parsed from YAML
// ABOUTME: A node is a command, a parallel group, a serial list of steps, or empty

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{ParserError, Result};

/// Logging settings. Only the root node's settings select the subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub debug: bool,
    pub disabled: bool,
    pub level: String,
}

impl LogConfig {
    /// Effective level filter, `debug` taking precedence over `level`.
    pub fn level(&self) -> &str {
        if self.debug {
            "debug"
        } else if self.level.trim().is_empty() {
            "info"
        } else {
            self.level.trim()
        }
    }
}

/// One node of the pipeline definition, keyed exactly as in the YAML.
///
/// ```yaml
/// name: deploy
/// timeout: 10m
/// steps:
///   - path: make
///     args: [build]
///   - parallel:
///       - { path: ./push.sh, args: [eu], onExit: restart-if-error }
///       - { path: ./push.sh, args: [us], onExit: restart-if-error }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
    #[serde(rename = "path")]
    pub command: String,
    pub args: Vec<String>,
    pub log: LogConfig,
    #[serde(rename = "onExit")]
    pub on_exit: String,
    pub parallel: Vec<NodeConfig>,
    pub steps: Vec<NodeConfig>,
    pub stderr: String,
    pub stdout: String,
    /// Humantime syntax such as `500ms`, `2s` or `1m 30s`. Fractional units
    /// (`1.5s`) are not accepted; write `1s 500ms` instead.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

/// Behavioral kind, resolved by field population in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Command,
    Parallel,
    Serial,
    Empty,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Command => "command",
            NodeKind::Parallel => "parallel",
            NodeKind::Serial => "serial",
            NodeKind::Empty => "empty",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl NodeConfig {
    /// Parse a pipeline from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let content = std::fs::read_to_string(path).map_err(|source| ParserError::IoError {
            path: display.clone(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|e| ParserError::InvalidYaml {
            path: display,
            source: Box::new(e),
        })
    }

    /// Parse a pipeline from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let node: NodeConfig = serde_yaml::from_str(content)?;
        Ok(node)
    }

    pub fn is_command(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn is_parallel(&self) -> bool {
        !self.parallel.is_empty()
    }

    pub fn is_serial(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn kind(&self) -> NodeKind {
        if self.is_command() {
            NodeKind::Command
        } else if self.is_parallel() {
            NodeKind::Parallel
        } else if self.is_serial() {
            NodeKind::Serial
        } else {
            NodeKind::Empty
        }
    }

    /// Display name: the explicit name, else the command, else the kind label.
    pub fn id(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }

        match self.kind() {
            NodeKind::Command => self.command.clone(),
            NodeKind::Parallel => "parallel".to_string(),
            NodeKind::Serial => "serial".to_string(),
            NodeKind::Empty => "[empty]".to_string(),
        }
    }

    /// Children in the order the resolved kind runs them.
    pub fn children(&self) -> &[NodeConfig] {
        match self.kind() {
            NodeKind::Parallel => &self.parallel,
            NodeKind::Serial => &self.steps,
            NodeKind::Command | NodeKind::Empty => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        let yaml = r#"
name: full
path: /bin/echo
args: [hello, world]
log:
  debug: true
  disabled: false
  level: warn
onExit: restart-if-error
stderr: devnul
stdout: /tmp/out.log
timeout: 1m30s
"#;

        let node = NodeConfig::from_yaml(yaml).unwrap();
        assert_eq!(node.name, "full");
        assert_eq!(node.command, "/bin/echo");
        assert_eq!(node.args, vec!["hello", "world"]);
        assert!(node.log.debug);
        assert_eq!(node.log.level(), "debug");
        assert_eq!(node.on_exit, "restart-if-error");
        assert_eq!(node.stderr, "devnul");
        assert_eq!(node.stdout, "/tmp/out.log");
        assert_eq!(node.timeout, Some(Duration::from_secs(90)));
        assert_eq!(node.kind(), NodeKind::Command);
    }

    #[test]
    fn test_kind_priority() {
        let leaf = NodeConfig {
            command: "true".to_string(),
            ..Default::default()
        };

        let both = NodeConfig {
            command: "true".to_string(),
            parallel: vec![leaf.clone()],
            steps: vec![leaf.clone()],
            ..Default::default()
        };
        assert_eq!(both.kind(), NodeKind::Command);
        assert!(both.children().is_empty());

        let group = NodeConfig {
            parallel: vec![leaf.clone()],
            steps: vec![leaf.clone(), leaf.clone()],
            ..Default::default()
        };
        assert_eq!(group.kind(), NodeKind::Parallel);
        assert_eq!(group.children().len(), 1);

        let steps = NodeConfig {
            steps: vec![leaf.clone(), leaf],
            ..Default::default()
        };
        assert_eq!(steps.kind(), NodeKind::Serial);

        assert_eq!(NodeConfig::default().kind(), NodeKind::Empty);
    }

    #[test]
    fn test_id_fallbacks() {
        let leaf = NodeConfig {
            command: "sh".to_string(),
            ..Default::default()
        };
        assert_eq!(leaf.id(), "sh");

        let named = NodeConfig {
            name: "build".to_string(),
            ..leaf.clone()
        };
        assert_eq!(named.id(), "build");

        let group = NodeConfig {
            parallel: vec![leaf.clone()],
            ..Default::default()
        };
        assert_eq!(group.id(), "parallel");

        let steps = NodeConfig {
            steps: vec![leaf],
            ..Default::default()
        };
        assert_eq!(steps.id(), "serial");

        assert_eq!(NodeConfig::default().id(), "[empty]");
    }

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogConfig::default().level(), "info");

        let config = LogConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        assert_eq!(config.level(), "warn");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = NodeConfig::from_yaml("steps: [").unwrap_err();
        assert!(err.to_string().starts_with("cannot unmarshal: "));

        let err = NodeConfig::from_yaml("timeout: soon").unwrap_err();
        assert!(matches!(err, ParserError::YamlError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = NodeConfig::from_file("/does/not/exist.yaml").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("cannot open /does/not/exist.yaml: "));
    }

    #[test]
    fn test_timeout_syntax() {
        let node = NodeConfig::from_yaml("path: sh\ntimeout: 1s 500ms\n").unwrap();
        assert_eq!(node.timeout, Some(Duration::from_millis(1500)));

        let node = NodeConfig::from_yaml("path: sh\ntimeout: 1m30s\n").unwrap();
        assert_eq!(node.timeout, Some(Duration::from_secs(90)));

        assert!(NodeConfig::from_yaml("path: sh\ntimeout: 1.5s\n").is_err());
    }
}
