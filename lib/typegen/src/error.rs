use crate::{
    config::error::ConfigError, fragments::FragmentError, mappers::MapperError,
    projection::error::ProjectionError, schema::error::SchemaError,
};

#[derive(Debug, thiserror::Error)]
pub enum TypegenError {
    #[error("Failed to parse GraphQL source: {0}")]
    ParseError(String),
    #[error(transparent)]
    SchemaError(#[from] SchemaError),
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    #[error(transparent)]
    FragmentError(#[from] FragmentError),
    #[error(transparent)]
    ProjectionError(#[from] ProjectionError),
    #[error(transparent)]
    MapperError(#[from] MapperError),
}
