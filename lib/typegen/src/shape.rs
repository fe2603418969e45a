use indexmap::{IndexMap, IndexSet};
use tracing::{instrument, trace};

use crate::{
    config::{FragmentMode, ResolvedConfig},
    ir::{
        modifiers::{unwrap_type, wrap_type},
        FragmentReference, NamedPick, RecordField, TypeExpression,
    },
    projection::{error::ProjectionError, fragment::FragmentSource},
    schema::SchemaState,
};

pub struct MaterializeContext<'a> {
    pub schema: &'a SchemaState,
    pub config: &'a ResolvedConfig,
    pub fragments: &'a dyn FragmentSource,
}

/// Rewrites a projected expression into the shape Emission prints: picks become records,
/// records of one intersection merge, and fragment references are inlined or kept masked.
#[instrument(level = "trace", skip_all)]
pub fn materialize(
    expression: &TypeExpression,
    context: &MaterializeContext<'_>,
) -> Result<TypeExpression, ProjectionError> {
    let mut materializer = Materializer {
        context,
        in_progress: IndexSet::new(),
    };

    materializer.visit(expression)
}

struct Materializer<'c, 'a> {
    context: &'c MaterializeContext<'a>,
    /// Fragments currently being inlined, outermost first.
    in_progress: IndexSet<String>,
}

impl Materializer<'_, '_> {
    fn visit(&mut self, expression: &TypeExpression) -> Result<TypeExpression, ProjectionError> {
        Ok(match expression {
            TypeExpression::Record(record) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    fields.push(RecordField::new(
                        &field.name,
                        field.optional,
                        self.visit(&field.value)?,
                    ));
                }
                TypeExpression::record(fields)
            }
            TypeExpression::Pick(pick) => self.expand_pick(pick)?,
            TypeExpression::Union(alternatives) => {
                let mut visited = Vec::with_capacity(alternatives.len());
                for alternative in alternatives {
                    visited.push(self.visit(alternative)?);
                }
                TypeExpression::union(visited)
            }
            TypeExpression::Intersection(parts) => {
                let mut visited = Vec::with_capacity(parts.len());
                for part in parts {
                    visited.push(self.visit(part)?);
                }
                merge_records(TypeExpression::intersection(visited))
            }
            TypeExpression::Array(array) => {
                TypeExpression::array(self.visit(&array.element)?, array.readonly)
            }
            TypeExpression::Nullable(inner) => TypeExpression::nullable(self.visit(inner)?),
            TypeExpression::Deferred(inner) => {
                TypeExpression::Deferred(Box::new(self.visit(inner)?))
            }
            TypeExpression::FragmentReference(reference) => self.substitute(reference)?,
            TypeExpression::Named(_) | TypeExpression::Literal(_) => expression.clone(),
        })
    }

    fn expand_pick(&self, pick: &NamedPick) -> Result<TypeExpression, ProjectionError> {
        let config = self.context.config;
        let mut fields = Vec::with_capacity(pick.fields.len());

        for field_name in &pick.fields {
            let definition = self
                .context
                .schema
                .field(&pick.parent, field_name)
                .ok_or_else(|| ProjectionError::FieldNotFound {
                    field_name: field_name.clone(),
                    type_name: pick.parent.clone(),
                })?;

            let field_type = &definition.field_type;
            fields.push(RecordField::new(
                field_name,
                field_type.is_nullable() && !config.avoid_optionals,
                wrap_type(
                    config.leaf_output(field_type.inner_type()),
                    field_type,
                    config.immutable_types,
                ),
            ));
        }

        Ok(TypeExpression::record(fields))
    }

    fn substitute(
        &mut self,
        reference: &FragmentReference,
    ) -> Result<TypeExpression, ProjectionError> {
        match self.context.config.fragment_mode {
            FragmentMode::Mask => return Ok(TypeExpression::FragmentReference(reference.clone())),
            FragmentMode::Combine => return Ok(TypeExpression::named(&reference.output_name)),
            FragmentMode::Inline => {}
        }

        if self.in_progress.contains(&reference.fragment) {
            trace!(
                fragment_name = reference.fragment.as_str(),
                "fragment already being inlined, leaving a reference"
            );
            return Ok(TypeExpression::FragmentReference(reference.clone()));
        }

        self.in_progress.insert(reference.fragment.clone());
        let shape = self.context.fragments.fragment_shape(reference);
        let result = shape.and_then(|shape| self.visit(&shape));
        self.in_progress.shift_remove(&reference.fragment);

        result
    }
}

/// Folds every record part of an intersection into the first one. A field present in several
/// records is optional only if it always was. Its values merge through their shared
/// `Nullable`/`Array` layers, and stay side by side when those layers differ.
fn merge_records(expression: TypeExpression) -> TypeExpression {
    let TypeExpression::Intersection(parts) = expression else {
        return expression;
    };

    let mut merged: IndexMap<String, RecordField> = IndexMap::new();
    let mut record_position = None;
    let mut rest = Vec::with_capacity(parts.len());

    for part in parts {
        match part {
            TypeExpression::Record(record) => {
                if record_position.is_none() {
                    record_position = Some(rest.len());
                }

                for field in record.fields {
                    match merged.get_mut(&field.name) {
                        Some(existing) => {
                            existing.optional = existing.optional && field.optional;
                            if existing.value != field.value {
                                existing.value = merge_values(&existing.value, field.value);
                            }
                        }
                        None => {
                            merged.insert(field.name.clone(), field);
                        }
                    }
                }
            }
            other => rest.push(other),
        }
    }

    if let Some(position) = record_position {
        rest.insert(
            position,
            TypeExpression::record(merged.into_values().collect()),
        );
    }

    TypeExpression::intersection(rest)
}

fn merge_values(existing: &TypeExpression, incoming: TypeExpression) -> TypeExpression {
    if unwrap_type(existing).1 != unwrap_type(&incoming).1 {
        return TypeExpression::intersection(vec![existing.clone(), incoming]);
    }

    merge_layers(existing, incoming)
}

fn merge_layers(existing: &TypeExpression, incoming: TypeExpression) -> TypeExpression {
    match (existing, incoming) {
        (TypeExpression::Nullable(left), TypeExpression::Nullable(right)) => {
            TypeExpression::nullable(merge_layers(left, *right))
        }
        (TypeExpression::Array(left), TypeExpression::Array(right))
            if left.readonly == right.readonly =>
        {
            TypeExpression::array(merge_layers(&left.element, *right.element), left.readonly)
        }
        (left, right) if *left == right => right,
        (left, right) => merge_records(TypeExpression::intersection(vec![left.clone(), right])),
    }
}
