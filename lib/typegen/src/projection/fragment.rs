use indexmap::IndexMap;
use serde::Serialize;
use tracing::{instrument, trace};

use crate::{
    ir::{FragmentReference, TypeExpression},
    naming::{ConvertOptions, NameKind},
};

use super::{error::ProjectionError, Projector};

static FRAGMENT_SUFFIX: &str = "Fragment";

/// A fragment projected against its own type condition, plus one variant per concrete type when
/// the condition is abstract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentProjection {
    pub name: String,
    pub output_name: String,
    pub type_condition: String,
    pub shape: TypeExpression,
    pub variants: IndexMap<String, FragmentVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentVariant {
    pub output_name: String,
    pub shape: TypeExpression,
}

impl FragmentProjection {
    /// The shape a reference stands for: the concrete variant when pinned and known, the
    /// type-condition shape otherwise.
    pub fn shape_for(&self, pinned_type: Option<&str>) -> &TypeExpression {
        pinned_type
            .and_then(|type_name| self.variants.get(type_name))
            .map(|variant| &variant.shape)
            .unwrap_or(&self.shape)
    }
}

/// Where fragment shapes come from when references are substituted.
pub trait FragmentSource {
    fn fragment_shape(&self, reference: &FragmentReference)
        -> Result<TypeExpression, ProjectionError>;
}

impl Projector<'_> {
    /// Fragment names are internal markers and never carry the types prefix.
    pub fn fragment_type_name(&self, fragment_name: &str, pinned_type: Option<&str>) -> String {
        let suffix = self.config.operation_suffix(fragment_name, FRAGMENT_SUFFIX);
        let suffix = match pinned_type {
            Some(type_name) => format!("_{}_{}", type_name, suffix),
            None => suffix.to_string(),
        };

        self.config.naming.convert(
            fragment_name,
            NameKind::TypeName,
            &ConvertOptions {
                suffix: Some(&suffix),
                use_types_prefix: Some(false),
                ..Default::default()
            },
        )
    }

    #[instrument(level = "trace", skip(self))]
    pub fn project_fragment(&self, name: &str) -> Result<FragmentProjection, ProjectionError> {
        let fragment =
            self.fragments
                .resolve(name)
                .ok_or_else(|| ProjectionError::FragmentNotFound {
                    fragment_name: name.to_string(),
                })?;

        let condition = fragment.type_condition.as_str();
        if self.schema.definition(condition).is_none() {
            return Err(ProjectionError::TypeConditionNotFound {
                type_name: condition.to_string(),
            });
        }

        let shape = self.project(condition, &fragment.selection_set)?;

        let mut variants = IndexMap::new();
        let possible_types = self.schema.possible_types(condition);
        if possible_types.len() > 1 {
            for possible_type in possible_types {
                trace!(possible_type = possible_type.as_str(), "projecting fragment variant");
                variants.insert(
                    possible_type.clone(),
                    FragmentVariant {
                        output_name: self.fragment_type_name(name, Some(possible_type)),
                        shape: self.project(possible_type, &fragment.selection_set)?,
                    },
                );
            }
        }

        Ok(FragmentProjection {
            name: fragment.name.clone(),
            output_name: self.fragment_type_name(name, None),
            type_condition: fragment.type_condition.clone(),
            shape,
            variants,
        })
    }
}

impl FragmentSource for Projector<'_> {
    fn fragment_shape(
        &self,
        reference: &FragmentReference,
    ) -> Result<TypeExpression, ProjectionError> {
        let projection = self.project_fragment(&reference.fragment)?;
        Ok(projection
            .shape_for(reference.pinned_type.as_deref())
            .clone())
    }
}
