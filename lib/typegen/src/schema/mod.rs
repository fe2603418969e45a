pub mod error;
pub mod type_node;

use std::{collections::HashMap, fmt::Display};

use graphql_parser::schema as input;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use self::{error::SchemaError, type_node::TypeNode};

static BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Boolean", "Int", "Float"];

pub type SchemaDocument<'a> = input::Document<'a, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperationKind {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "mutation")]
    Mutation,
    #[serde(rename = "subscription")]
    Subscription,
}

impl OperationKind {
    /// The suffix appended to operation result type names.
    pub fn type_suffix(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

type DefinitionMap = IndexMap<String, SchemaDefinition>;

#[derive(Debug, Clone)]
pub struct SchemaState {
    /// Every named type of the schema in declaration order, built-in scalars included.
    pub definitions: DefinitionMap,
    /// The root entrypoints
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    /// Concrete object types each composite type may resolve to at runtime.
    possible_types: HashMap<String, Vec<String>>,
}

impl SchemaState {
    #[instrument(level = "trace", skip(schema), name = "new_schema_state")]
    pub fn new(schema: &SchemaDocument<'_>) -> Result<Self, SchemaError> {
        let mut definitions = Self::build_map(schema);
        Self::apply_extensions(schema, &mut definitions);
        let (query_type, mutation_type, subscription_type) =
            Self::extract_root_types(schema, &definitions)?;

        for (kind, root) in [
            (OperationKind::Query, Some(&query_type)),
            (OperationKind::Mutation, mutation_type.as_ref()),
            (OperationKind::Subscription, subscription_type.as_ref()),
        ] {
            if let Some(SchemaDefinition::Object(object_type)) =
                root.and_then(|name| definitions.get_mut(name))
            {
                object_type.root_type = Some(kind);
            }
        }

        let possible_types = Self::compute_possible_types(&definitions);

        Ok(Self {
            definitions,
            query_type,
            mutation_type,
            subscription_type,
            possible_types,
        })
    }

    pub fn definition(&self, type_name: &str) -> Option<&SchemaDefinition> {
        self.definitions.get(type_name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&SchemaField> {
        self.definition(type_name)
            .and_then(|definition| definition.fields())
            .and_then(|fields| fields.get(field_name))
    }

    pub fn is_leaf_type(&self, type_name: &str) -> bool {
        self.definition(type_name)
            .is_some_and(|definition| definition.is_leaf_type())
    }

    pub fn is_abstract_type(&self, type_name: &str) -> bool {
        self.definition(type_name)
            .is_some_and(|definition| definition.is_abstract_type())
    }

    pub fn root_type_for(&self, operation_kind: OperationKind) -> Option<&str> {
        match operation_kind {
            OperationKind::Query => Some(&self.query_type),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn is_root_type(&self, type_name: &str) -> bool {
        self.root_kind_of(type_name).is_some()
    }

    pub fn root_kind_of(&self, type_name: &str) -> Option<OperationKind> {
        match self.definition(type_name) {
            Some(SchemaDefinition::Object(object_type)) => object_type.root_type,
            _ => None,
        }
    }

    /// Concrete object types a value of `type_name` can be, in declaration order.
    /// Objects resolve to themselves; leaves and unknown names have none.
    pub fn possible_types(&self, type_name: &str) -> &[String] {
        self.possible_types
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a selection conditioned on `condition` applies to values of `concrete_type`.
    pub fn type_applies(&self, condition: &str, concrete_type: &str) -> bool {
        condition == concrete_type
            || self
                .possible_types(condition)
                .iter()
                .any(|possible| possible == concrete_type)
    }

    /// Whether an object type can show up behind an interface or a union.
    pub fn is_abstract_member(&self, object_name: &str) -> bool {
        self.definitions.values().any(|definition| {
            definition.is_abstract_type()
                && self
                    .possible_types(definition.name())
                    .iter()
                    .any(|possible| possible == object_name)
        })
    }

    fn extract_root_types(
        schema: &SchemaDocument<'_>,
        definitions: &DefinitionMap,
    ) -> Result<(String, Option<String>, Option<String>), SchemaError> {
        let schema_definition = schema.definitions.iter().find_map(|d| match d {
            input::Definition::SchemaDefinition(schema_definition) => Some(schema_definition),
            _ => None,
        });

        let resolve = |kind: OperationKind,
                       explicit: Option<&String>|
         -> Result<Option<String>, SchemaError> {
            match explicit {
                Some(type_name) if definitions.contains_key(type_name) => {
                    Ok(Some(type_name.to_string()))
                }
                Some(type_name) => Err(SchemaError::UnknownRootType {
                    operation_kind: kind,
                    type_name: type_name.to_string(),
                }),
                None if schema_definition.is_none()
                    && definitions.contains_key(kind.type_suffix()) =>
                {
                    Ok(Some(kind.type_suffix().to_string()))
                }
                None => Ok(None),
            }
        };

        let query_type = resolve(
            OperationKind::Query,
            schema_definition.and_then(|s| s.query.as_ref()),
        )?
        .ok_or(SchemaError::MissingQueryType)?;
        let mutation_type = resolve(
            OperationKind::Mutation,
            schema_definition.and_then(|s| s.mutation.as_ref()),
        )?;
        let subscription_type = resolve(
            OperationKind::Subscription,
            schema_definition.and_then(|s| s.subscription.as_ref()),
        )?;

        Ok((query_type, mutation_type, subscription_type))
    }

    #[instrument(level = "trace", skip(schema))]
    fn build_map(schema: &SchemaDocument<'_>) -> DefinitionMap {
        let mut definitions = DefinitionMap::new();

        for builtin in BUILTIN_SCALARS {
            definitions.insert(
                builtin.to_string(),
                SchemaDefinition::Scalar(ScalarType {
                    name: builtin.to_string(),
                    builtin: true,
                }),
            );
        }

        for definition in &schema.definitions {
            let built = match definition {
                input::Definition::TypeDefinition(input::TypeDefinition::Object(object_type)) => {
                    SchemaDefinition::Object(Self::build_object_type(object_type))
                }
                input::Definition::TypeDefinition(input::TypeDefinition::Interface(
                    interface_type,
                )) => SchemaDefinition::Interface(Self::build_interface_type(interface_type)),
                input::Definition::TypeDefinition(input::TypeDefinition::Union(union_type)) => {
                    SchemaDefinition::Union(UnionType {
                        name: union_type.name.to_string(),
                        types: union_type.types.clone(),
                    })
                }
                input::Definition::TypeDefinition(input::TypeDefinition::Enum(enum_type)) => {
                    SchemaDefinition::Enum(EnumType {
                        name: enum_type.name.to_string(),
                        values: enum_type
                            .values
                            .iter()
                            .map(|value| value.name.to_string())
                            .collect(),
                    })
                }
                input::Definition::TypeDefinition(input::TypeDefinition::Scalar(scalar_type)) => {
                    SchemaDefinition::Scalar(ScalarType {
                        name: scalar_type.name.to_string(),
                        builtin: BUILTIN_SCALARS.contains(&scalar_type.name.as_str()),
                    })
                }
                input::Definition::TypeDefinition(input::TypeDefinition::InputObject(
                    input_object_type,
                )) => SchemaDefinition::InputObject(InputObjectType {
                    name: input_object_type.name.to_string(),
                    fields: Self::build_input_values(&input_object_type.fields),
                }),
                _ => continue,
            };

            definitions.insert(built.name().to_string(), built);
        }

        definitions
    }

    fn apply_extensions(schema: &SchemaDocument<'_>, definitions: &mut DefinitionMap) {
        for definition in &schema.definitions {
            let input::Definition::TypeExtension(extension) = definition else {
                continue;
            };

            match extension {
                input::TypeExtension::Object(ext) => {
                    if let Some(SchemaDefinition::Object(object_type)) =
                        definitions.get_mut(&ext.name)
                    {
                        object_type.fields.extend(Self::build_fields(&ext.fields));
                        object_type
                            .implements
                            .extend(ext.implements_interfaces.iter().cloned());
                        object_type
                            .keys
                            .extend(Self::extract_key_directives(&ext.directives));
                    }
                }
                input::TypeExtension::Interface(ext) => {
                    if let Some(SchemaDefinition::Interface(interface_type)) =
                        definitions.get_mut(&ext.name)
                    {
                        interface_type.fields.extend(Self::build_fields(&ext.fields));
                        interface_type
                            .keys
                            .extend(Self::extract_key_directives(&ext.directives));
                    }
                }
                input::TypeExtension::Union(ext) => {
                    if let Some(SchemaDefinition::Union(union_type)) =
                        definitions.get_mut(&ext.name)
                    {
                        union_type.types.extend(ext.types.iter().cloned());
                    }
                }
                input::TypeExtension::Enum(ext) => {
                    if let Some(SchemaDefinition::Enum(enum_type)) = definitions.get_mut(&ext.name)
                    {
                        enum_type
                            .values
                            .extend(ext.values.iter().map(|value| value.name.to_string()));
                    }
                }
                input::TypeExtension::InputObject(ext) => {
                    if let Some(SchemaDefinition::InputObject(input_object_type)) =
                        definitions.get_mut(&ext.name)
                    {
                        input_object_type
                            .fields
                            .extend(Self::build_input_values(&ext.fields));
                    }
                }
                input::TypeExtension::Scalar(_) => {}
            }
        }
    }

    #[instrument(level = "trace", skip(definitions), fields(definitions_count = definitions.len()))]
    fn compute_possible_types(definitions: &DefinitionMap) -> HashMap<String, Vec<String>> {
        let mut possible_types: HashMap<String, Vec<String>> = HashMap::new();

        for definition in definitions.values() {
            match definition {
                SchemaDefinition::Object(object_type) => {
                    possible_types.insert(object_type.name.clone(), vec![object_type.name.clone()]);

                    for interface_name in &object_type.implements {
                        let implementers =
                            possible_types.entry(interface_name.clone()).or_default();
                        if !implementers.contains(&object_type.name) {
                            implementers.push(object_type.name.clone());
                        }
                    }
                }
                SchemaDefinition::Interface(interface_type) => {
                    possible_types.entry(interface_type.name.clone()).or_default();
                }
                SchemaDefinition::Union(union_type) => {
                    let members = union_type.types.iter().fold(Vec::new(), |mut acc, t| {
                        if !acc.contains(t) {
                            acc.push(t.clone());
                        }
                        acc
                    });
                    possible_types.insert(union_type.name.clone(), members);
                }
                _ => {}
            }
        }

        trace!("computed possible types for {} types", possible_types.len());

        possible_types
    }

    #[instrument(level = "trace", skip(object_type), fields(name = object_type.name))]
    fn build_object_type(object_type: &input::ObjectType<'_, String>) -> ObjectType {
        ObjectType {
            name: object_type.name.to_string(),
            fields: Self::build_fields(&object_type.fields),
            implements: object_type.implements_interfaces.clone(),
            keys: Self::extract_key_directives(&object_type.directives),
            root_type: None,
        }
    }

    #[instrument(level = "trace", skip(interface_type), fields(name = interface_type.name))]
    fn build_interface_type(interface_type: &input::InterfaceType<'_, String>) -> InterfaceType {
        InterfaceType {
            name: interface_type.name.to_string(),
            fields: Self::build_fields(&interface_type.fields),
            keys: Self::extract_key_directives(&interface_type.directives),
        }
    }

    fn build_fields(fields: &[input::Field<'_, String>]) -> IndexMap<String, SchemaField> {
        fields
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    SchemaField {
                        name: field.name.to_string(),
                        field_type: (&field.field_type).into(),
                        arguments: Self::build_input_values(&field.arguments),
                        external: field
                            .directives
                            .iter()
                            .any(|directive| directive.name == "external"),
                    },
                )
            })
            .collect()
    }

    fn build_input_values(
        values: &[input::InputValue<'_, String>],
    ) -> IndexMap<String, InputValue> {
        values
            .iter()
            .map(|value| {
                (
                    value.name.to_string(),
                    InputValue {
                        name: value.name.to_string(),
                        value_type: (&value.value_type).into(),
                        has_default: value.default_value.is_some(),
                    },
                )
            })
            .collect()
    }

    fn extract_key_directives(directives: &[input::Directive<'_, String>]) -> Vec<KeyDirective> {
        directives
            .iter()
            .filter(|directive| directive.name == "key")
            .filter_map(|directive| {
                let mut fields = None;
                let mut resolvable = true;

                for (name, value) in &directive.arguments {
                    match (name.as_str(), value) {
                        ("fields", input::Value::String(v)) => fields = Some(v.to_string()),
                        ("resolvable", input::Value::Boolean(v)) => resolvable = *v,
                        _ => {}
                    }
                }

                fields.map(|fields| KeyDirective { fields, resolvable })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum SchemaDefinition {
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    Scalar(ScalarType),
    InputObject(InputObjectType),
}

impl SchemaDefinition {
    pub fn name(&self) -> &str {
        match self {
            SchemaDefinition::Object(object_type) => &object_type.name,
            SchemaDefinition::Interface(interface_type) => &interface_type.name,
            SchemaDefinition::Union(union_type) => &union_type.name,
            SchemaDefinition::Enum(enum_type) => &enum_type.name,
            SchemaDefinition::Scalar(scalar_type) => &scalar_type.name,
            SchemaDefinition::InputObject(input_type) => &input_type.name,
        }
    }

    pub fn is_composite_type(&self) -> bool {
        matches!(
            self,
            SchemaDefinition::Object(_)
                | SchemaDefinition::Interface(_)
                | SchemaDefinition::Union(_)
        )
    }

    pub fn is_abstract_type(&self) -> bool {
        matches!(
            self,
            SchemaDefinition::Interface(_) | SchemaDefinition::Union(_)
        )
    }

    pub fn is_leaf_type(&self) -> bool {
        matches!(self, SchemaDefinition::Scalar(_) | SchemaDefinition::Enum(_))
    }

    /// Output fields, for the types that have them.
    pub fn fields(&self) -> Option<&IndexMap<String, SchemaField>> {
        match self {
            SchemaDefinition::Object(object_type) => Some(&object_type.fields),
            SchemaDefinition::Interface(interface_type) => Some(&interface_type.fields),
            _ => None,
        }
    }

    pub fn keys(&self) -> &[KeyDirective] {
        match self {
            SchemaDefinition::Object(object_type) => &object_type.keys,
            SchemaDefinition::Interface(interface_type) => &interface_type.keys,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, SchemaField>,
    pub implements: Vec<String>,
    pub keys: Vec<KeyDirective>,
    pub root_type: Option<OperationKind>,
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub name: String,
    pub fields: IndexMap<String, SchemaField>,
    pub keys: Vec<KeyDirective>,
}

#[derive(Debug, Clone)]
pub struct UnionType {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: String,
    pub builtin: bool,
}

#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: String,
    pub fields: IndexMap<String, InputValue>,
}

#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: String,
    pub field_type: TypeNode,
    pub arguments: IndexMap<String, InputValue>,
    /// Marked `@external`: owned by another service.
    pub external: bool,
}

#[derive(Debug, Clone)]
pub struct InputValue {
    pub name: String,
    pub value_type: TypeNode,
    pub has_default: bool,
}

/// A federation `@key(fields: "...", resolvable: ...)` on an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirective {
    pub fields: String,
    pub resolvable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(sdl: &str) -> Result<SchemaState, SchemaError> {
        let document = graphql_parser::parse_schema::<String>(sdl).unwrap();
        SchemaState::new(&document)
    }

    #[test]
    fn computes_possible_types_in_declaration_order() {
        let schema = state(
            r#"
            type Query { node: Node }
            interface Node { id: ID! }
            type User implements Node { id: ID! }
            type Post implements Node { id: ID! }
            union Result = Post | User
            "#,
        )
        .unwrap();

        assert_eq!(schema.possible_types("Node"), &["User", "Post"]);
        assert_eq!(schema.possible_types("Result"), &["Post", "User"]);
        assert_eq!(schema.possible_types("User"), &["User"]);
        assert!(schema.possible_types("String").is_empty());
        assert!(schema.type_applies("Node", "Post"));
        assert!(!schema.type_applies("User", "Post"));
        assert!(schema.is_abstract_member("User"));
        assert!(!schema.is_abstract_member("Query"));
    }

    #[test]
    fn falls_back_to_conventional_root_names() {
        let schema = state("type Query { a: String } type Mutation { b: String }").unwrap();
        assert_eq!(schema.root_type_for(OperationKind::Query), Some("Query"));
        assert_eq!(schema.root_type_for(OperationKind::Mutation), Some("Mutation"));
        assert_eq!(schema.root_type_for(OperationKind::Subscription), None);
        assert_eq!(schema.root_kind_of("Mutation"), Some(OperationKind::Mutation));
    }

    #[test]
    fn honours_schema_definition() {
        let schema = state("schema { query: Root } type Root { a: String } type Query { b: Int }")
            .unwrap();
        assert_eq!(schema.query_type, "Root");
        assert!(!schema.is_root_type("Query"));
    }

    #[test]
    fn reports_missing_roots() {
        assert_eq!(
            state("type Foo { a: String }").unwrap_err(),
            SchemaError::MissingQueryType
        );
        assert_eq!(
            state("schema { query: Query mutation: Missing } type Query { a: String }")
                .unwrap_err(),
            SchemaError::UnknownRootType {
                operation_kind: OperationKind::Mutation,
                type_name: "Missing".to_string()
            }
        );
    }

    #[test]
    fn merges_type_extensions() {
        let schema = state(
            r#"
            type Query { a: String }
            extend type Query { b: Int }
            enum Color { RED }
            extend enum Color { BLUE }
            "#,
        )
        .unwrap();

        assert!(schema.field("Query", "b").is_some());
        match schema.definition("Color") {
            Some(SchemaDefinition::Enum(enum_type)) => {
                assert_eq!(enum_type.values, vec!["RED", "BLUE"])
            }
            other => panic!("unexpected definition {:?}", other),
        }
    }

    #[test]
    fn extracts_federation_metadata() {
        let schema = state(
            r#"
            type Query { me: User }
            type User @key(fields: "id") @key(fields: "email", resolvable: false) {
              id: ID!
              email: String
              reviews: [String] @external
            }
            "#,
        )
        .unwrap();

        let user = schema.definition("User").unwrap();
        assert_eq!(
            user.keys(),
            &[
                KeyDirective {
                    fields: "id".to_string(),
                    resolvable: true
                },
                KeyDirective {
                    fields: "email".to_string(),
                    resolvable: false
                }
            ]
        );
        assert!(schema.field("User", "reviews").unwrap().external);
        assert!(schema.is_leaf_type("ID"));
    }
}
