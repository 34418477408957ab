// ABOUTME: Error types for pipeline definition loading
// ABOUTME: Definition errors are fatal and reported before anything runs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("cannot open {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot unmarshal: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid YAML in {path}: {source}")]
    InvalidYaml {
        path: String,
        #[source]
        source: Box<ParserError>,
    },
}

pub type Result<T> = std::result::Result<T, ParserError>;
