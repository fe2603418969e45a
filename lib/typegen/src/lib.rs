pub mod ast;
pub mod config;
pub mod error;
pub mod fragments;
pub mod ir;
pub mod mappers;
pub mod naming;
pub mod operations;
pub mod projection;
pub mod resolvers;
pub mod scalars;
pub mod schema;
pub mod shape;
pub mod utils;

#[cfg(test)]
mod tests;

use ast::document::Document;
use error::TypegenError;

pub use config::{ResolvedConfig, TypegenConfig};
pub use ir::TypeExpression;
pub use operations::{project_documents, ProjectedDocuments};
pub use schema::SchemaState;

pub fn parse_schema(sdl: &str) -> Result<SchemaState, TypegenError> {
    let document = graphql_parser::parse_schema::<String>(sdl)
        .map_err(|err| TypegenError::ParseError(err.to_string()))?;

    Ok(SchemaState::new(&document)?)
}

pub fn parse_document(source: &str) -> Result<Document, TypegenError> {
    let document = graphql_parser::parse_query::<String>(source)
        .map_err(|err| TypegenError::ParseError(err.to_string()))?;

    Ok(Document::from(&document))
}
