use indexmap::IndexMap;
use serde::Serialize;
use tracing::{instrument, trace};

use crate::{
    config::ResolvedConfig,
    ir::{modifiers::wrap_type, Record, RecordField, TypeExpression},
    naming::{ConvertOptions, NameKind},
    projection::error::ProjectionError,
    schema::{
        type_node::TypeNode, InputValue, OperationKind, SchemaDefinition, SchemaField, SchemaState,
    },
};

static FEDERATION_TYPES: [&str; 4] = ["_Service", "_Any", "_Entity", "_FieldSet"];
static FEDERATION_ROOT_FIELDS: [&str; 2] = ["_service", "_entities"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolverKind {
    /// Resolves one value per request.
    Value,
    /// Produces an event stream, then resolves a value from each event.
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolverSignature {
    pub field_name: String,
    pub result: TypeExpression,
    pub parent: TypeExpression,
    pub context: TypeExpression,
    /// Present only when the field declares arguments. Never optional as a whole.
    pub args: Option<Record>,
    pub kind: ResolverKind,
}

/// `resolveType` of an interface or union.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeResolverSignature {
    pub parent: TypeExpression,
    pub context: TypeExpression,
    pub possible_types: Vec<String>,
}

/// `__resolveReference` of a federated entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceResolverSignature {
    pub result: TypeExpression,
    pub context: TypeExpression,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolverMap {
    pub type_name: String,
    pub output_name: String,
    pub fields: IndexMap<String, ResolverSignature>,
    pub resolve_type: Option<TypeResolverSignature>,
    /// The object can appear behind an interface or union and may need `isTypeOf`.
    pub is_type_of: bool,
    pub reference_resolver: Option<ReferenceResolverSignature>,
}

pub struct ResolverBuilder<'a> {
    schema: &'a SchemaState,
    config: &'a ResolvedConfig,
}

impl<'a> ResolverBuilder<'a> {
    pub fn new(schema: &'a SchemaState, config: &'a ResolvedConfig) -> Self {
        Self { schema, config }
    }

    /// Resolver maps of every object, interface and union in declaration order. Introspection
    /// types are skipped, and so are federation's own types when federation is on.
    #[instrument(level = "trace", skip(self))]
    pub fn project_all(&self) -> Result<Vec<ResolverMap>, ProjectionError> {
        let mut maps = vec![];

        for definition in self.schema.definitions.values() {
            let name = definition.name();
            if !definition.is_composite_type() || name.starts_with("__") {
                continue;
            }

            if self.config.federation && FEDERATION_TYPES.contains(&name) {
                trace!(type_name = name, "skipping federation type");
                continue;
            }

            maps.push(self.project_resolver_map(name)?);
        }

        Ok(maps)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn project_resolver_map(&self, type_name: &str) -> Result<ResolverMap, ProjectionError> {
        let definition =
            self.schema
                .definition(type_name)
                .ok_or_else(|| ProjectionError::UnknownType {
                    type_name: type_name.to_string(),
                })?;

        if !definition.is_composite_type() {
            return Err(ProjectionError::NotCompositeType {
                type_name: type_name.to_string(),
            });
        }

        let root_kind = self.schema.root_kind_of(type_name);
        let parent = self.parent_type(type_name);
        let context = self.config.context_type.to_expression();

        let mut fields = IndexMap::new();
        for field in definition.fields().into_iter().flat_map(|fields| fields.values()) {
            if self.config.federation && field.external {
                trace!(field_name = field.name.as_str(), "skipping external field");
                continue;
            }

            if self.config.federation
                && root_kind == Some(OperationKind::Query)
                && FEDERATION_ROOT_FIELDS.contains(&field.name.as_str())
            {
                continue;
            }

            fields.insert(
                field.name.clone(),
                self.field_signature(field, &parent, &context, root_kind)?,
            );
        }

        let resolve_type = definition.is_abstract_type().then(|| TypeResolverSignature {
            parent: parent.clone(),
            context: context.clone(),
            possible_types: self.schema.possible_types(type_name).to_vec(),
        });

        let is_type_of = matches!(definition, SchemaDefinition::Object(_))
            && self.schema.is_abstract_member(type_name);

        let keys: Vec<String> = definition
            .keys()
            .iter()
            .filter(|key| key.resolvable)
            .map(|key| key.fields.clone())
            .collect();
        let reference_resolver = (self.config.federation && !keys.is_empty()).then(|| {
            ReferenceResolverSignature {
                result: TypeExpression::nullable(self.model_type(type_name)),
                context: context.clone(),
                keys,
            }
        });

        Ok(ResolverMap {
            type_name: type_name.to_string(),
            output_name: self.config.naming.convert(
                type_name,
                NameKind::TypeName,
                &ConvertOptions::with_suffix("Resolvers"),
            ),
            fields,
            resolve_type,
            is_type_of,
            reference_resolver,
        })
    }

    fn field_signature(
        &self,
        field: &SchemaField,
        parent: &TypeExpression,
        context: &TypeExpression,
        root_kind: Option<OperationKind>,
    ) -> Result<ResolverSignature, ProjectionError> {
        let base_type = field.field_type.inner_type();
        if self.schema.definition(base_type).is_none() {
            return Err(ProjectionError::UnknownType {
                type_name: base_type.to_string(),
            });
        }

        let args = (!field.arguments.is_empty()).then(|| self.args_record(&field.arguments));

        Ok(ResolverSignature {
            field_name: field.name.clone(),
            result: self.wrap(self.model_type(base_type), &field.field_type),
            parent: parent.clone(),
            context: context.clone(),
            args,
            kind: match root_kind {
                Some(OperationKind::Subscription) => ResolverKind::Subscription,
                _ => ResolverKind::Value,
            },
        })
    }

    /// Arguments with defaults always reach the resolver, so only nullable arguments without
    /// one are optional.
    fn args_record(&self, arguments: &IndexMap<String, InputValue>) -> Record {
        Record::new(
            arguments
                .values()
                .map(|argument| {
                    let base = argument.value_type.inner_type();
                    let value = self.config.scalars.input(base).unwrap_or_else(|| {
                        TypeExpression::named(self.config.naming.type_name(base))
                    });

                    RecordField::new(
                        &argument.name,
                        argument.value_type.is_nullable() && !argument.has_default,
                        self.wrap(value, &argument.value_type),
                    )
                })
                .collect(),
        )
    }

    /// Root operation types have no model of their own unless one is mapped.
    fn parent_type(&self, type_name: &str) -> TypeExpression {
        if self.schema.is_root_type(type_name) && !self.config.mappers.contains_key(type_name) {
            return TypeExpression::empty_record();
        }

        self.model_type(type_name)
    }

    /// The server-side type standing for a schema type, in order: its mapper, the scalar table
    /// for leaves, the members' models for abstract types, the default mapper, the generated
    /// type name.
    pub fn model_type(&self, type_name: &str) -> TypeExpression {
        if let Some(mapper) = self.config.mappers.get(type_name) {
            return mapper.to_expression();
        }

        if self.schema.is_leaf_type(type_name) {
            return self.config.leaf_output(type_name);
        }

        if self.schema.is_abstract_type(type_name) {
            return TypeExpression::union(
                self.schema
                    .possible_types(type_name)
                    .iter()
                    .map(|possible_type| self.model_type(possible_type))
                    .collect(),
            );
        }

        let converted = self.config.naming.type_name(type_name);
        match &self.config.default_mapper {
            Some(default_mapper) => default_mapper.with_placeholder(&converted).to_expression(),
            None => TypeExpression::named(converted),
        }
    }

    fn wrap(&self, base: TypeExpression, type_node: &TypeNode) -> TypeExpression {
        wrap_type(base, type_node, self.config.immutable_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypegenConfig;
    use pretty_assertions::assert_eq;

    fn schema(source: &str) -> SchemaState {
        let document = graphql_parser::parse_schema::<String>(source).unwrap();
        SchemaState::new(&document).unwrap()
    }

    #[test]
    fn abstract_model_is_union_of_member_models() {
        let schema = schema(
            r#"
            type Query { search: [SearchResult!]! }
            union SearchResult = User | Post
            type User { id: ID! }
            type Post { id: ID! }
            "#,
        );
        let mut config = TypegenConfig::default();
        config
            .mappers
            .insert("User".to_string(), "./models#UserModel".to_string());
        let config = config.resolve(&schema).unwrap();
        let builder = ResolverBuilder::new(&schema, &config);

        insta::assert_snapshot!(builder.model_type("SearchResult"), @"(UserModel | Post)");

        let query = builder.project_resolver_map("Query").unwrap();
        assert_eq!(query.fields["search"].parent, TypeExpression::empty_record());
        insta::assert_snapshot!(query.fields["search"].result, @"Array<(UserModel | Post)>");

        let union = builder.project_resolver_map("SearchResult").unwrap();
        assert!(union.fields.is_empty());
        assert_eq!(
            union.resolve_type.map(|signature| signature.possible_types),
            Some(vec!["User".to_string(), "Post".to_string()])
        );
        assert!(builder.project_resolver_map("User").unwrap().is_type_of);
    }

    #[test]
    fn rejects_leaf_types() {
        let schema = schema("type Query { a: String }");
        let config = TypegenConfig::default().resolve(&schema).unwrap();
        assert_eq!(
            ResolverBuilder::new(&schema, &config)
                .project_resolver_map("String")
                .unwrap_err(),
            ProjectionError::NotCompositeType {
                type_name: "String".to_string()
            }
        );
    }
}
