use crate::mappers::MapperError;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown naming convention '{reference}'")]
    UnknownNamingConvention { reference: String },
    #[error("Malformed type reference for '{type_name}': {source}")]
    MalformedMapper {
        type_name: String,
        #[source]
        source: MapperError,
    },
    #[error("Malformed type reference in '{option}': {source}")]
    MalformedOption {
        option: String,
        #[source]
        source: MapperError,
    },
}
