pub mod error;
pub mod fragment;

mod collect;

use indexmap::{IndexMap, IndexSet};
use tracing::instrument;

use crate::{
    ast::{
        selection_item::Selection,
        selection_set::{FieldSelection, SelectionSet},
    },
    config::ResolvedConfig,
    fragments::FragmentRegistry,
    ir::{modifiers::wrap_type, NamedPick, RecordField, TypeExpression},
    schema::{type_node::TypeNode, OperationKind, SchemaField, SchemaState},
};

use self::{collect::Collected, error::ProjectionError};

/// Introspection fields answered by every query root: name, placeholder type, nullability.
static META_FIELDS: [(&str, &str, bool); 2] = [
    ("__schema", "__Schema", false),
    ("__type", "__Type", true),
];

/// Walks selection sets against the schema and folds them into type expressions.
/// Holds only shared, read-only inputs; every call returns a fresh expression.
pub struct Projector<'a> {
    schema: &'a SchemaState,
    fragments: &'a FragmentRegistry,
    config: &'a ResolvedConfig,
}

enum LinkSelection<'s, 'a> {
    Field {
        definition: &'a SchemaField,
        selections: Vec<&'s Selection>,
    },
    Meta {
        type_name: &'static str,
        nullable: bool,
    },
}

#[derive(Default)]
struct Partition<'s, 'a> {
    typename_queried: bool,
    primitives: IndexSet<&'s str>,
    aliases: IndexMap<&'s str, RecordField>,
    links: IndexMap<&'s str, LinkSelection<'s, 'a>>,
}

impl<'a> Projector<'a> {
    pub fn new(
        schema: &'a SchemaState,
        fragments: &'a FragmentRegistry,
        config: &'a ResolvedConfig,
    ) -> Self {
        Self {
            schema,
            fragments,
            config,
        }
    }

    pub fn schema(&self) -> &'a SchemaState {
        self.schema
    }

    pub fn fragments(&self) -> &'a FragmentRegistry {
        self.fragments
    }

    pub fn config(&self) -> &'a ResolvedConfig {
        self.config
    }

    #[instrument(level = "trace", skip(self, selection_set), fields(parent_type = parent_type))]
    pub fn project(
        &self,
        parent_type: &str,
        selection_set: &SelectionSet,
    ) -> Result<TypeExpression, ProjectionError> {
        let selections: Vec<&Selection> = selection_set.items.iter().collect();
        self.project_selections(parent_type, &selections)
    }

    pub fn project_root(
        &self,
        operation_kind: OperationKind,
        selection_set: &SelectionSet,
    ) -> Result<TypeExpression, ProjectionError> {
        let root_type = self
            .schema
            .root_type_for(operation_kind)
            .ok_or(ProjectionError::MissingRootType { operation_kind })?;

        self.project(root_type, selection_set)
    }

    fn project_selections(
        &self,
        parent_type: &str,
        selections: &[&Selection],
    ) -> Result<TypeExpression, ProjectionError> {
        let definition =
            self.schema
                .definition(parent_type)
                .ok_or_else(|| ProjectionError::UnknownType {
                    type_name: parent_type.to_string(),
                })?;

        if !definition.is_composite_type() {
            return Err(ProjectionError::NotCompositeType {
                type_name: parent_type.to_string(),
            });
        }

        let is_abstract = definition.is_abstract_type();
        let mut collected = Collected::default();
        self.collect(parent_type, is_abstract, selections, &mut collected)?;
        let partition = self.partition(parent_type, &collected.fields)?;

        let mut parts = Vec::new();

        if let Some(discriminant) = self.discriminant(parent_type, partition.typename_queried) {
            parts.push(discriminant);
        }

        if !partition.primitives.is_empty() {
            parts.push(TypeExpression::Pick(NamedPick {
                parent: parent_type.to_string(),
                fields: partition
                    .primitives
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            }));
        }

        if !partition.aliases.is_empty() {
            parts.push(TypeExpression::record(
                partition.aliases.into_values().collect(),
            ));
        }

        if !partition.links.is_empty() {
            let mut fields = Vec::with_capacity(partition.links.len());
            for (response_key, link) in partition.links {
                fields.push(self.project_link(response_key, link)?);
            }
            parts.push(TypeExpression::record(fields));
        }

        parts.extend(
            collected
                .references
                .into_iter()
                .map(TypeExpression::FragmentReference),
        );

        for deferred in collected.deferred {
            let selections: Vec<&Selection> = deferred.selections.items.iter().collect();
            parts.push(TypeExpression::Deferred(Box::new(
                self.project_selections(parent_type, &selections)?,
            )));
        }

        if is_abstract && !collected.branches.is_empty() {
            let mut alternatives = Vec::new();
            let mut uncovered = false;

            for possible_type in self.schema.possible_types(parent_type) {
                match collected.branches.get(possible_type) {
                    Some(branch) => {
                        alternatives.push(self.project_selections(possible_type, branch)?)
                    }
                    None => uncovered = true,
                }
            }

            if uncovered {
                alternatives.push(TypeExpression::empty_record());
            }

            parts.push(TypeExpression::union(alternatives));
        }

        Ok(TypeExpression::intersection(parts))
    }

    fn partition<'s>(
        &self,
        parent_type: &str,
        fields: &[&'s FieldSelection],
    ) -> Result<Partition<'s, 'a>, ProjectionError> {
        let mut partition = Partition::default();
        let mut response_keys: IndexMap<&'s str, &'s str> = IndexMap::new();

        for field in fields.iter().copied() {
            let response_key = field.response_key();

            if let Some(existing) = response_keys.insert(response_key, field.name.as_str()) {
                if existing != field.name {
                    return Err(ProjectionError::FieldMergeConflict {
                        response_key: response_key.to_string(),
                        type_name: parent_type.to_string(),
                    });
                }
            }

            if field.is_typename() {
                match &field.alias {
                    None => partition.typename_queried = true,
                    Some(alias) => {
                        partition.aliases.insert(
                            alias.as_str(),
                            RecordField::new(alias, false, self.typename_value(parent_type)),
                        );
                    }
                }
                continue;
            }

            if let Some(&(_, type_name, nullable)) = META_FIELDS
                .iter()
                .find(|(name, _, _)| *name == field.name)
            {
                partition
                    .links
                    .insert(response_key, LinkSelection::Meta { type_name, nullable });
                continue;
            }

            let definition = self.schema.field(parent_type, &field.name).ok_or_else(|| {
                ProjectionError::FieldNotFound {
                    field_name: field.name.to_string(),
                    type_name: parent_type.to_string(),
                }
            })?;

            let base_type = definition.field_type.inner_type();
            if self.schema.definition(base_type).is_none() {
                return Err(ProjectionError::UnknownType {
                    type_name: base_type.to_string(),
                });
            }

            if self.schema.is_leaf_type(base_type) {
                match &field.alias {
                    None => {
                        partition.primitives.insert(field.name.as_str());
                    }
                    Some(alias) => {
                        partition.aliases.insert(
                            alias.as_str(),
                            RecordField::new(
                                alias,
                                self.is_optional(&definition.field_type),
                                self.wrap(
                                    self.config.leaf_output(base_type),
                                    &definition.field_type,
                                ),
                            ),
                        );
                    }
                }
                continue;
            }

            match partition.links.entry(response_key).or_insert_with(|| {
                LinkSelection::Field {
                    definition,
                    selections: Vec::new(),
                }
            }) {
                LinkSelection::Field { selections, .. } => {
                    selections.extend(field.selections.items.iter())
                }
                LinkSelection::Meta { .. } => {}
            }
        }

        Ok(partition)
    }

    fn project_link(
        &self,
        response_key: &str,
        link: LinkSelection<'_, 'a>,
    ) -> Result<RecordField, ProjectionError> {
        match link {
            LinkSelection::Field {
                definition,
                selections,
            } => {
                let shape =
                    self.project_selections(definition.field_type.inner_type(), &selections)?;

                Ok(RecordField::new(
                    response_key,
                    self.is_optional(&definition.field_type),
                    self.wrap(shape, &definition.field_type),
                ))
            }
            LinkSelection::Meta {
                type_name,
                nullable,
            } => {
                let value = TypeExpression::named(type_name);
                Ok(match nullable {
                    true => RecordField::new(
                        response_key,
                        !self.config.avoid_optionals,
                        TypeExpression::nullable(value),
                    ),
                    false => RecordField::new(response_key, false, value),
                })
            }
        }
    }

    fn discriminant(&self, parent_type: &str, queried: bool) -> Option<TypeExpression> {
        if !queried
            && (self.config.skip_typename
                || (self.config.skip_type_name_for_root && self.schema.is_root_type(parent_type)))
        {
            return None;
        }

        let optional = !queried && !self.config.non_optional_typename;

        Some(TypeExpression::record(vec![RecordField::new(
            "__typename",
            optional,
            self.typename_value(parent_type),
        )]))
    }

    /// Literal names of every concrete type the parent may be.
    fn typename_value(&self, parent_type: &str) -> TypeExpression {
        TypeExpression::union(
            self.schema
                .possible_types(parent_type)
                .iter()
                .map(TypeExpression::literal)
                .collect(),
        )
    }

    pub(crate) fn wrap(&self, base: TypeExpression, type_node: &TypeNode) -> TypeExpression {
        wrap_type(base, type_node, self.config.immutable_types)
    }

    pub(crate) fn is_optional(&self, type_node: &TypeNode) -> bool {
        type_node.is_nullable() && !self.config.avoid_optionals
    }
}
