pub mod error;

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    ir::TypeExpression,
    mappers::{parse_mapper, ExternalImport, TypeReference},
    naming::{NamingFunction, NamingPolicy, NamingResolver},
    scalars::ScalarMap,
    schema::SchemaState,
};

use self::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypegenConfig {
    /// How schema names become output identifiers: `"keep"`, a case convention such as
    /// `"pascalCase"` or `"change-case-all#camelCase"`, or a map with `typeNames` and
    /// `enumValues`.
    ///
    /// Default: pascal case, keeping underscores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_convention: Option<NamingConventionConfig>,

    /// Prepended to every generated type name.
    #[serde(default)]
    pub types_prefix: String,

    /// Appended to every generated type name.
    #[serde(default)]
    pub types_suffix: String,

    /// Output type per scalar. A value may be an external reference (`./scalars#DateTime`) and
    /// may be split into `input` and `output`.
    #[serde(default)]
    pub scalars: BTreeMap<String, ScalarConfig>,

    /// Type used for custom scalars without an entry in `scalars`.
    #[serde(default = "default_scalar_type")]
    pub default_scalar_type: String,

    /// Never emit the `__typename` discriminant unless it is queried.
    #[serde(default)]
    pub skip_typename: bool,

    /// Make the `__typename` discriminant required.
    #[serde(default)]
    pub non_optional_typename: bool,

    /// Skip the discriminant on root operation types unless it is queried.
    #[serde(default)]
    pub skip_type_name_for_root: bool,

    /// Do not append the operation suffix when the name already ends with it.
    #[serde(default)]
    pub dedupe_operation_suffix: bool,

    /// Never append operation or fragment suffixes.
    #[serde(default)]
    pub omit_operation_suffix: bool,

    /// Resolver model type per schema type name.
    #[serde(default)]
    pub mappers: BTreeMap<String, String>,

    /// Resolver model type for types without a mapper. `{T}` stands for the type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mapper: Option<String>,

    /// Appended to external mapper identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapper_type_suffix: Option<String>,

    /// Resolver context type.
    #[serde(default = "default_context_type")]
    pub context_type: String,

    /// Produce read-only arrays.
    #[serde(default)]
    pub immutable_types: bool,

    /// Render nullable fields as required (still nullable) instead of optional.
    #[serde(default)]
    pub avoid_optionals: bool,

    /// Generate reference resolvers for `@key` entities and skip `@external` fields.
    #[serde(default)]
    pub federation: bool,

    /// How fragment references are materialized.
    #[serde(default)]
    pub inline_fragment_types: FragmentMode,

    /// What happens to untyped inline fragments carrying `@defer`.
    #[serde(default)]
    pub defer_handling: DeferHandling,
}

impl Default for TypegenConfig {
    fn default() -> Self {
        Self {
            naming_convention: None,
            types_prefix: String::new(),
            types_suffix: String::new(),
            scalars: BTreeMap::new(),
            default_scalar_type: default_scalar_type(),
            skip_typename: false,
            non_optional_typename: false,
            skip_type_name_for_root: false,
            dedupe_operation_suffix: false,
            omit_operation_suffix: false,
            mappers: BTreeMap::new(),
            default_mapper: None,
            mapper_type_suffix: None,
            context_type: default_context_type(),
            immutable_types: false,
            avoid_optionals: false,
            federation: false,
            inline_fragment_types: FragmentMode::default(),
            defer_handling: DeferHandling::default(),
        }
    }
}

fn default_scalar_type() -> String {
    "any".to_string()
}

fn default_context_type() -> String {
    "any".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum NamingConventionConfig {
    Convention(String),
    PerKind(NamingConventionMap),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NamingConventionMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<String>,
    /// Convert whole names instead of each underscore-separated part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_underscore: Option<bool>,
}

impl NamingConventionConfig {
    pub fn to_policy(&self) -> Result<NamingPolicy, ConfigError> {
        match self {
            NamingConventionConfig::Convention(reference) if reference == "keep" => {
                Ok(NamingPolicy::Keep)
            }
            NamingConventionConfig::Convention(reference) => Ok(NamingPolicy::Custom(
                NamingFunction::from_reference(reference)?,
            )),
            NamingConventionConfig::PerKind(map) => Ok(NamingPolicy::PerKind {
                type_names: map
                    .type_names
                    .as_deref()
                    .map(NamingFunction::from_reference)
                    .transpose()?,
                enum_values: map
                    .enum_values
                    .as_deref()
                    .map(NamingFunction::from_reference)
                    .transpose()?,
                transform_underscore: map.transform_underscore,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ScalarConfig {
    Single(String),
    Variance { input: String, output: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FragmentMode {
    /// Fragment references are replaced by the fragment's fields.
    #[default]
    Inline,
    /// Fragment references become the fragment's named type, intersected with the parent.
    Combine,
    /// Fragment references stay opaque and must be unwrapped explicitly.
    Mask,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeferHandling {
    #[default]
    Flatten,
    Incremental,
}

/// JSON schema of the configuration file.
pub fn config_json_schema() -> schemars::Schema {
    schemars::schema_for!(TypegenConfig)
}

impl TypegenConfig {
    #[instrument(level = "trace", skip_all)]
    pub fn resolve(&self, schema: &SchemaState) -> Result<ResolvedConfig, ConfigError> {
        let policy = match &self.naming_convention {
            Some(naming_convention) => naming_convention.to_policy()?,
            None => NamingPolicy::default(),
        };

        self.resolve_with_naming(schema, policy)
    }

    /// Same as [`TypegenConfig::resolve`], with a naming policy supplied by the caller instead
    /// of `namingConvention`. This is how custom conversion functions are plugged in.
    pub fn resolve_with_naming(
        &self,
        schema: &SchemaState,
        policy: NamingPolicy,
    ) -> Result<ResolvedConfig, ConfigError> {
        let naming = NamingResolver::new(&policy, &self.types_prefix, &self.types_suffix);
        let scalars = ScalarMap::build(schema, &self.scalars, &self.default_scalar_type, &naming)?;
        let mapper_suffix = self.mapper_type_suffix.as_deref();

        let mappers = self
            .mappers
            .iter()
            .map(|(type_name, reference)| {
                parse_mapper(reference, type_name, mapper_suffix)
                    .map(|parsed| (type_name.clone(), parsed))
                    .map_err(|source| ConfigError::MalformedMapper {
                        type_name: type_name.clone(),
                        source,
                    })
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        let default_mapper = self
            .default_mapper
            .as_deref()
            .map(|reference| {
                parse_mapper(reference, "{T}", mapper_suffix).map_err(|source| {
                    ConfigError::MalformedOption {
                        option: "defaultMapper".to_string(),
                        source,
                    }
                })
            })
            .transpose()?;

        let context_type = parse_mapper(&self.context_type, "Context", None).map_err(|source| {
            ConfigError::MalformedOption {
                option: "contextType".to_string(),
                source,
            }
        })?;

        debug!(
            mappers = mappers.len(),
            has_default_mapper = default_mapper.is_some(),
            "configuration resolved"
        );

        Ok(ResolvedConfig {
            naming,
            scalars,
            mappers,
            default_mapper,
            context_type,
            skip_typename: self.skip_typename,
            non_optional_typename: self.non_optional_typename,
            skip_type_name_for_root: self.skip_type_name_for_root,
            dedupe_operation_suffix: self.dedupe_operation_suffix,
            omit_operation_suffix: self.omit_operation_suffix,
            immutable_types: self.immutable_types,
            avoid_optionals: self.avoid_optionals,
            federation: self.federation,
            fragment_mode: self.inline_fragment_types,
            defer_handling: self.defer_handling,
        })
    }
}

/// Configuration after every string option has been parsed. Read-only during projection.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub naming: NamingResolver,
    pub scalars: ScalarMap,
    pub mappers: IndexMap<String, TypeReference>,
    pub default_mapper: Option<TypeReference>,
    pub context_type: TypeReference,
    pub skip_typename: bool,
    pub non_optional_typename: bool,
    pub skip_type_name_for_root: bool,
    pub dedupe_operation_suffix: bool,
    pub omit_operation_suffix: bool,
    pub immutable_types: bool,
    pub avoid_optionals: bool,
    pub federation: bool,
    pub fragment_mode: FragmentMode,
    pub defer_handling: DeferHandling,
}

impl ResolvedConfig {
    /// The suffix to append to `name`, honouring `omitOperationSuffix` and
    /// `dedupeOperationSuffix`.
    pub fn operation_suffix<'a>(&self, name: &str, suffix: &'a str) -> &'a str {
        if self.omit_operation_suffix
            || (self.dedupe_operation_suffix
                && name.to_lowercase().ends_with(&suffix.to_lowercase()))
        {
            return "";
        }

        suffix
    }

    /// Output type of a scalar or enum, falling back to its converted name.
    pub fn leaf_output(&self, type_name: &str) -> TypeExpression {
        self.scalars
            .output(type_name)
            .unwrap_or_else(|| TypeExpression::named(self.naming.type_name(type_name)))
    }

    /// Every import the scalar table, the mappers and the context type need, deduplicated.
    pub fn external_imports(&self) -> Vec<ExternalImport> {
        self.scalars
            .external_imports()
            .chain(
                self.mappers
                    .values()
                    .chain(self.default_mapper.iter())
                    .chain(std::iter::once(&self.context_type))
                    .filter_map(TypeReference::external_import),
            )
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaState {
        let document = graphql_parser::parse_schema::<String>(
            "type Query { user: User } type User { id: ID! }",
        )
        .unwrap();
        SchemaState::new(&document).unwrap()
    }

    #[test]
    fn deserializes_camel_case_options_with_defaults() {
        let config: TypegenConfig = serde_json::from_value(serde_json::json!({
            "namingConvention": { "typeNames": "change-case-all#pascalCase", "enumValues": "keep" },
            "scalars": { "DateTime": { "input": "string", "output": "Date" }, "JSON": "unknown" },
            "skipTypeNameForRoot": true,
            "inlineFragmentTypes": "mask",
            "deferHandling": "incremental"
        }))
        .unwrap();

        assert_eq!(config.default_scalar_type, "any");
        assert_eq!(config.context_type, "any");
        assert!(config.skip_type_name_for_root);
        assert_eq!(config.inline_fragment_types, FragmentMode::Mask);
        assert_eq!(config.defer_handling, DeferHandling::Incremental);
        assert_eq!(
            config.scalars.get("JSON"),
            Some(&ScalarConfig::Single("unknown".to_string()))
        );
        assert!(matches!(
            config.naming_convention,
            Some(NamingConventionConfig::PerKind(_))
        ));
    }

    #[test]
    fn rejects_unknown_options() {
        let result = serde_json::from_value::<TypegenConfig>(serde_json::json!({
            "skipTypenames": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn resolution_fails_before_projection_on_bad_references() {
        let config = TypegenConfig {
            naming_convention: Some(NamingConventionConfig::Convention("bogusCase".to_string())),
            ..Default::default()
        };
        assert_eq!(
            config.resolve(&schema()).unwrap_err(),
            ConfigError::UnknownNamingConvention {
                reference: "bogusCase".to_string()
            }
        );

        let mut config = TypegenConfig::default();
        config
            .mappers
            .insert("User".to_string(), "./models#".to_string());
        assert!(matches!(
            config.resolve(&schema()).unwrap_err(),
            ConfigError::MalformedMapper { type_name, .. } if type_name == "User"
        ));
    }

    #[test]
    fn collects_external_imports_once() {
        let mut config = TypegenConfig {
            context_type: "./context#Context".to_string(),
            default_mapper: Some("./models#Partial<{T}>".to_string()),
            ..Default::default()
        };
        config
            .mappers
            .insert("User".to_string(), "./models#UserModel".to_string());
        config
            .scalars
            .insert("ID".to_string(), ScalarConfig::Single("./context#Context".to_string()));

        let resolved = config.resolve(&schema()).unwrap();
        let imports: Vec<_> = resolved
            .external_imports()
            .into_iter()
            .map(|import| format!("{}:{}", import.source, import.import))
            .collect();

        assert_eq!(
            imports,
            vec!["./context:Context", "./models:Partial", "./models:UserModel"]
        );
    }

    #[test]
    fn operation_suffix_policy() {
        let schema = schema();
        let resolved = TypegenConfig::default().resolve(&schema).unwrap();
        assert_eq!(resolved.operation_suffix("GetUserQuery", "Query"), "Query");

        let resolved = TypegenConfig {
            dedupe_operation_suffix: true,
            ..Default::default()
        }
        .resolve(&schema)
        .unwrap();
        assert_eq!(resolved.operation_suffix("GetUserQuery", "Query"), "");
        assert_eq!(resolved.operation_suffix("GetUser", "Query"), "Query");

        let resolved = TypegenConfig {
            omit_operation_suffix: true,
            ..Default::default()
        }
        .resolve(&schema)
        .unwrap();
        assert_eq!(resolved.operation_suffix("GetUser", "Query"), "");
    }

    #[test]
    fn json_schema_lists_options() {
        let schema = serde_json::to_string(&config_json_schema()).unwrap();
        assert!(schema.contains("skipTypeNameForRoot"));
        assert!(schema.contains("inlineFragmentTypes"));
    }
}
