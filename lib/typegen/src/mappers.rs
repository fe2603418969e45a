use serde::{Deserialize, Serialize};

use crate::ir::TypeExpression;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum MapperError {
    #[error("Type reference is empty")]
    EmptyReference,
    #[error("Type reference '{reference}' has an empty module path")]
    EmptySource { reference: String },
    #[error("Type reference '{reference}' does not name an identifier after '#'")]
    EmptyIdentifier { reference: String },
    #[error("Type reference '{reference}' has too many '#' separators")]
    TooManySegments { reference: String },
    #[error("Type reference '{reference}' has an empty alias")]
    EmptyAlias { reference: String },
}

/// A type used in place of a generated one: either a type name Emission can print as is, or
/// an identifier imported from another module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeReference {
    Inline { type_name: String },
    External(ExternalReference),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    pub source: String,
    /// What the import statement binds, e.g. `User`, `User as UserModel` or a namespace.
    pub import: String,
    /// How the type is spelled at use sites.
    pub type_name: String,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalImport {
    pub source: String,
    pub import: String,
    pub default: bool,
}

impl TypeReference {
    pub fn inline(type_name: impl Into<String>) -> Self {
        TypeReference::Inline {
            type_name: type_name.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            TypeReference::Inline { type_name } => type_name,
            TypeReference::External(external) => &external.type_name,
        }
    }

    pub fn to_expression(&self) -> TypeExpression {
        TypeExpression::named(self.type_name())
    }

    pub fn external_import(&self) -> Option<ExternalImport> {
        match self {
            TypeReference::Inline { .. } => None,
            TypeReference::External(external) => Some(ExternalImport {
                source: external.source.clone(),
                import: external.import.clone(),
                default: external.default,
            }),
        }
    }

    /// Replaces the `{T}` placeholder with a schema type name.
    pub fn with_placeholder(&self, type_name: &str) -> TypeReference {
        let replace = |value: &str| value.replace("{T}", type_name);

        match self {
            TypeReference::Inline { type_name: inline } => TypeReference::inline(replace(inline)),
            TypeReference::External(external) => TypeReference::External(ExternalReference {
                type_name: replace(&external.type_name),
                ..external.clone()
            }),
        }
    }
}

pub fn is_external_reference(reference: &str) -> bool {
    reference.contains('#')
}

/// Parses a mapper string:
///
/// - `Type` or `Partial<Type>`: inline
/// - `./module#Identifier`, optionally `as Alias`
/// - `./module#default`, optionally `as Alias`: default export named after the GraphQL type
/// - `./module#Namespace.Identifier` or the legacy `./module#Namespace#Identifier`
pub fn parse_mapper(
    reference: &str,
    gql_type_name: &str,
    suffix: Option<&str>,
) -> Result<TypeReference, MapperError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(MapperError::EmptyReference);
    }

    if !is_external_reference(reference) {
        return Ok(TypeReference::inline(reference));
    }

    let items: Vec<&str> = reference.split('#').map(str::trim).collect();
    let source = items[0];
    if source.is_empty() {
        return Err(MapperError::EmptySource {
            reference: reference.to_string(),
        });
    }

    if items.len() > 3 {
        return Err(MapperError::TooManySegments {
            reference: reference.to_string(),
        });
    }

    if items[1..].iter().any(|item| item.is_empty()) {
        return Err(MapperError::EmptyIdentifier {
            reference: reference.to_string(),
        });
    }

    let maybe_suffix = |type_name: &str| match suffix {
        Some(suffix) => add_suffix(type_name, suffix),
        None => type_name.to_string(),
    };

    let path = items[1];
    let is_default = path == "default" || path.starts_with("default ");
    let alias = split_alias(path, reference)?;

    let (type_name, import) = if items.len() == 3 {
        let (namespace, identifier) = (items[1], items[2]);
        (format!("{}.{}", namespace, identifier), namespace.to_string())
    } else if let Some((namespace, _)) = path.split_once('.').filter(|_| alias.is_none()) {
        (path.to_string(), namespace.to_string())
    } else if let Some((imported, alias)) = alias {
        let type_name = maybe_suffix(alias);
        let import = if is_default {
            type_name.clone()
        } else {
            format!("{} as {}", imported, type_name)
        };
        (type_name, import)
    } else if is_default {
        let type_name = maybe_suffix(gql_type_name);
        (type_name.clone(), type_name)
    } else {
        let type_name = maybe_suffix(path);
        let import = if suffix.is_some() {
            format!("{} as {}", path, type_name)
        } else {
            type_name.clone()
        };
        (type_name, import)
    };

    Ok(TypeReference::External(ExternalReference {
        source: source.to_string(),
        import: strip_generics(&import),
        type_name,
        default: is_default && items.len() == 2,
    }))
}

fn split_alias<'a>(
    path: &'a str,
    reference: &str,
) -> Result<Option<(&'a str, &'a str)>, MapperError> {
    let mut parts = path.split_whitespace();

    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(imported), Some("as"), Some(alias), None) => Ok(Some((imported, alias))),
        (Some(_), Some("as"), None, None) => Err(MapperError::EmptyAlias {
            reference: reference.to_string(),
        }),
        _ => Ok(None),
    }
}

fn add_suffix(type_name: &str, suffix: &str) -> String {
    match type_name.find('<') {
        Some(generic) => format!(
            "{}{}{}",
            &type_name[..generic],
            suffix,
            &type_name[generic..]
        ),
        None => format!("{}{}", type_name, suffix),
    }
}

fn strip_generics(value: &str) -> String {
    let mut depth = 0usize;
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }

    result
}
