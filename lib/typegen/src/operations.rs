use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    ast::{
        document::Document,
        operation::{OperationDefinition, VariableDefinition},
    },
    config::ResolvedConfig,
    error::TypegenError,
    fragments::FragmentRegistry,
    ir::{FragmentReference, RecordField, TypeExpression},
    naming::{ConvertOptions, NameKind},
    projection::{
        error::ProjectionError,
        fragment::{FragmentProjection, FragmentSource},
        Projector,
    },
    schema::{OperationKind, SchemaState},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationProjection {
    /// The operation's own name, or the generated placeholder for anonymous operations.
    pub name: String,
    pub operation_kind: OperationKind,
    pub result_type_name: String,
    pub variables_type_name: String,
    pub result_type: TypeExpression,
    pub variables_type: TypeExpression,
    /// Fragments the result spreads directly or through nested fields.
    pub fragment_references: Vec<FragmentReference>,
}

pub struct OperationBuilder<'a> {
    projector: Projector<'a>,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(projector: Projector<'a>) -> Self {
        Self { projector }
    }

    pub fn projector(&self) -> &Projector<'a> {
        &self.projector
    }

    /// `anonymous_index` names the operation when it has no name of its own.
    #[instrument(level = "trace", skip(self, operation), fields(operation_name = ?operation.name))]
    pub fn project_operation(
        &self,
        operation: &OperationDefinition,
        anonymous_index: usize,
    ) -> Result<OperationProjection, ProjectionError> {
        let config = self.projector.config();
        let name = match &operation.name {
            Some(name) => name.clone(),
            None => format!("Unnamed_{}_", anonymous_index),
        };

        let suffix = config.operation_suffix(&name, operation.operation_kind.type_suffix());
        let result_type_name = config
            .naming
            .convert(&name, NameKind::TypeName, &ConvertOptions::with_suffix(suffix));
        let variables_suffix = format!("{}Variables", suffix);
        let variables_type_name = config.naming.convert(
            &name,
            NameKind::TypeName,
            &ConvertOptions::with_suffix(&variables_suffix),
        );

        let result_type = self
            .projector
            .project_root(operation.operation_kind, &operation.selection_set)?;
        let variables_type = self.project_variables(&operation.variable_definitions);
        let fragment_references = result_type
            .fragment_references()
            .into_iter()
            .cloned()
            .collect();

        Ok(OperationProjection {
            name,
            operation_kind: operation.operation_kind,
            result_type_name,
            variables_type_name,
            result_type,
            variables_type,
            fragment_references,
        })
    }

    /// A variable with a default value is optional whatever its nullability; otherwise it is
    /// optional iff nullable.
    pub fn project_variables(&self, variables: &[VariableDefinition]) -> TypeExpression {
        let config = self.projector.config();

        TypeExpression::record(
            variables
                .iter()
                .map(|variable| {
                    let variable_type = &variable.variable_type;
                    let base = variable_type.inner_type();
                    let value = config.scalars.input(base).unwrap_or_else(|| {
                        TypeExpression::named(config.naming.type_name(base))
                    });

                    RecordField::new(
                        &variable.name,
                        variable.default_value.is_some() || variable_type.is_nullable(),
                        self.projector.wrap(value, variable_type),
                    )
                })
                .collect(),
        )
    }
}

/// Every operation and fragment of a document batch, projected once.
#[derive(Debug, Clone)]
pub struct ProjectedDocuments {
    pub registry: FragmentRegistry,
    /// In emission order, dependencies first.
    pub fragments: IndexMap<String, FragmentProjection>,
    pub operations: Vec<OperationProjection>,
}

impl FragmentSource for ProjectedDocuments {
    fn fragment_shape(
        &self,
        reference: &FragmentReference,
    ) -> Result<TypeExpression, ProjectionError> {
        self.fragments
            .get(&reference.fragment)
            .map(|projection| {
                projection
                    .shape_for(reference.pinned_type.as_deref())
                    .clone()
            })
            .ok_or_else(|| ProjectionError::FragmentNotFound {
                fragment_name: reference.fragment.clone(),
            })
    }
}

/// Registers every fragment of the batch first, then projects fragments in emission order and
/// operations in document order. Anonymous operations are numbered from 1 across the batch.
#[instrument(level = "debug", skip_all, fields(documents_count = documents.len()))]
pub fn project_documents(
    schema: &SchemaState,
    documents: &[Document],
    config: &ResolvedConfig,
) -> Result<ProjectedDocuments, TypegenError> {
    let registry = FragmentRegistry::from_documents(documents)?;

    let (fragments, operations) = {
        let projector = Projector::new(schema, &registry, config);

        let mut fragments = IndexMap::with_capacity(registry.len());
        for name in registry.emission_order() {
            fragments.insert(name.to_string(), projector.project_fragment(name)?);
        }

        let builder = OperationBuilder::new(projector);
        let mut operations = vec![];
        let mut anonymous_count = 0;
        for document in documents {
            for operation in &document.operations {
                if operation.is_anonymous() {
                    anonymous_count += 1;
                }
                operations.push(builder.project_operation(operation, anonymous_count)?);
            }
        }

        (fragments, operations)
    };

    debug!(
        fragments_count = fragments.len(),
        operations_count = operations.len(),
        "documents projected"
    );

    Ok(ProjectedDocuments {
        registry,
        fragments,
        operations,
    })
}
