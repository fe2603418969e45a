use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::{instrument, trace};

use crate::{
    config::{error::ConfigError, ScalarConfig},
    ir::TypeExpression,
    mappers::{parse_mapper, ExternalImport, TypeReference},
    naming::NamingResolver,
    schema::{SchemaDefinition, SchemaState},
};

static DEFAULT_SCALARS: [(&str, &str); 5] = [
    ("ID", "string"),
    ("String", "string"),
    ("Boolean", "boolean"),
    ("Int", "number"),
    ("Float", "number"),
];

/// Output types of a scalar or enum, split by the direction values flow in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarMapping {
    pub input: TypeReference,
    pub output: TypeReference,
}

impl ScalarMapping {
    fn both(reference: TypeReference) -> Self {
        Self {
            input: reference.clone(),
            output: reference,
        }
    }
}

/// Scalar and enum name to output type, built in three layers: built-in defaults, every schema
/// scalar mapped to the default placeholder (enums to their generated name), then overrides.
#[derive(Debug, Clone, Default)]
pub struct ScalarMap {
    mappings: IndexMap<String, ScalarMapping>,
}

impl ScalarMap {
    #[instrument(level = "trace", skip_all, fields(overrides = overrides.len()))]
    pub fn build(
        schema: &SchemaState,
        overrides: &BTreeMap<String, ScalarConfig>,
        default_scalar_type: &str,
        naming: &NamingResolver,
    ) -> Result<Self, ConfigError> {
        let mut mappings = IndexMap::new();

        for (name, output) in DEFAULT_SCALARS {
            mappings.insert(
                name.to_string(),
                ScalarMapping::both(TypeReference::inline(output)),
            );
        }

        for definition in schema.definitions.values() {
            match definition {
                SchemaDefinition::Scalar(scalar_type) if !scalar_type.builtin => {
                    mappings.insert(
                        scalar_type.name.clone(),
                        ScalarMapping::both(TypeReference::inline(default_scalar_type)),
                    );
                }
                SchemaDefinition::Enum(enum_type) => {
                    mappings.insert(
                        enum_type.name.clone(),
                        ScalarMapping::both(TypeReference::inline(
                            naming.type_name(&enum_type.name),
                        )),
                    );
                }
                _ => {}
            }
        }

        for (name, config) in overrides {
            let parse = |reference: &str| {
                parse_mapper(reference, name, None).map_err(|source| {
                    ConfigError::MalformedMapper {
                        type_name: name.clone(),
                        source,
                    }
                })
            };

            let mapping = match config {
                ScalarConfig::Single(reference) => ScalarMapping::both(parse(reference)?),
                ScalarConfig::Variance { input, output } => ScalarMapping {
                    input: parse(input)?,
                    output: parse(output)?,
                },
            };

            trace!(scalar = name.as_str(), "scalar mapping overridden");
            mappings.insert(name.clone(), mapping);
        }

        Ok(Self { mappings })
    }

    pub fn get(&self, name: &str) -> Option<&ScalarMapping> {
        self.mappings.get(name)
    }

    pub fn output(&self, name: &str) -> Option<TypeExpression> {
        self.get(name).map(|mapping| mapping.output.to_expression())
    }

    pub fn input(&self, name: &str) -> Option<TypeExpression> {
        self.get(name).map(|mapping| mapping.input.to_expression())
    }

    pub fn external_imports(&self) -> impl Iterator<Item = ExternalImport> + '_ {
        self.mappings.values().flat_map(|mapping| {
            mapping
                .input
                .external_import()
                .into_iter()
                .chain(mapping.output.external_import())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaState {
        let document = graphql_parser::parse_schema::<String>(
            r#"
            scalar DateTime
            scalar JSON
            enum user_role { ADMIN }
            type Query { now: DateTime }
            "#,
        )
        .unwrap();
        SchemaState::new(&document).unwrap()
    }

    #[test]
    fn layers_defaults_schema_scalars_and_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "DateTime".to_string(),
            ScalarConfig::Variance {
                input: "Date | string".to_string(),
                output: "./scalars#DateTime".to_string(),
            },
        );
        overrides.insert("ID".to_string(), ScalarConfig::Single("number".to_string()));

        let map = ScalarMap::build(&schema(), &overrides, "unknown", &NamingResolver::default())
            .unwrap();

        assert_eq!(map.output("String"), Some(TypeExpression::named("string")));
        assert_eq!(map.output("ID"), Some(TypeExpression::named("number")));
        assert_eq!(map.output("JSON"), Some(TypeExpression::named("unknown")));
        assert_eq!(map.input("DateTime"), Some(TypeExpression::named("Date | string")));
        assert_eq!(map.output("DateTime"), Some(TypeExpression::named("DateTime")));
        assert_eq!(map.output("user_role"), Some(TypeExpression::named("User_Role")));
        assert_eq!(map.output("Missing"), None);

        let imports: Vec<_> = map.external_imports().collect();
        assert_eq!(
            imports,
            vec![ExternalImport {
                source: "./scalars".to_string(),
                import: "DateTime".to_string(),
                default: false,
            }]
        );
    }

    #[test]
    fn malformed_override_is_reported_with_scalar_name() {
        let mut overrides = BTreeMap::new();
        overrides.insert("JSON".to_string(), ScalarConfig::Single("#".to_string()));

        let error = ScalarMap::build(&schema(), &overrides, "any", &NamingResolver::default())
            .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::MalformedMapper { type_name, .. } if type_name == "JSON"
        ));
    }
}
