use std::collections::HashMap;

use tracing::trace;

use crate::{
    ast::{
        fragment::FragmentDefinition,
        selection_item::Selection,
        selection_set::{FieldSelection, InlineFragmentSelection},
    },
    config::DeferHandling,
    ir::FragmentReference,
};

use super::{error::ProjectionError, Projector};

/// Selections of one parent type after fragments are resolved against it.
#[derive(Default)]
pub(super) struct Collected<'s> {
    /// Fields that apply to every value of the parent type.
    pub fields: Vec<&'s FieldSelection>,
    /// Named fragments whose condition covers the whole parent type.
    pub references: Vec<FragmentReference>,
    /// Selections that apply to one concrete type only, keyed by that type.
    pub branches: HashMap<String, Vec<&'s Selection>>,
    pub deferred: Vec<&'s InlineFragmentSelection>,
}

impl Projector<'_> {
    pub(super) fn collect<'s>(
        &self,
        parent_type: &str,
        is_abstract: bool,
        selections: &[&'s Selection],
        collected: &mut Collected<'s>,
    ) -> Result<(), ProjectionError> {
        for selection in selections.iter().copied() {
            match selection {
                Selection::Field(field) => collected.fields.push(field),
                Selection::InlineFragment(inline) => {
                    self.collect_inline(parent_type, is_abstract, inline, collected)?
                }
                Selection::FragmentSpread(spread) => {
                    let fragment = self.fragments.resolve(&spread.fragment_name).ok_or_else(
                        || ProjectionError::FragmentNotFound {
                            fragment_name: spread.fragment_name.clone(),
                        },
                    )?;
                    self.ensure_type_condition(&fragment.type_condition)?;

                    let condition = fragment.type_condition.as_str();
                    if condition == parent_type {
                        collected.references.push(self.fragment_reference(fragment, None));
                    } else if !is_abstract && self.schema.type_applies(condition, parent_type) {
                        let pinned = (self.schema.possible_types(condition).len() > 1)
                            .then_some(parent_type);
                        collected
                            .references
                            .push(self.fragment_reference(fragment, pinned));
                    } else if is_abstract {
                        self.distribute(parent_type, condition, [selection], collected);
                    } else {
                        trace!(
                            fragment_name = fragment.name.as_str(),
                            "fragment condition never matches parent type, skipping"
                        );
                    }
                }
            }
        }

        Ok(())
    }

    fn collect_inline<'s>(
        &self,
        parent_type: &str,
        is_abstract: bool,
        inline: &'s InlineFragmentSelection,
        collected: &mut Collected<'s>,
    ) -> Result<(), ProjectionError> {
        let items: Vec<&'s Selection> = inline.selections.items.iter().collect();

        let Some(condition) = inline.type_condition.as_deref() else {
            if inline.is_deferred() && self.config.defer_handling == DeferHandling::Incremental {
                collected.deferred.push(inline);
                return Ok(());
            }

            return self.collect(parent_type, is_abstract, &items, collected);
        };

        self.ensure_type_condition(condition)?;

        if condition == parent_type
            || (!is_abstract && self.schema.type_applies(condition, parent_type))
        {
            self.collect(parent_type, is_abstract, &items, collected)
        } else if is_abstract {
            self.distribute(parent_type, condition, items, collected);
            Ok(())
        } else {
            trace!(
                type_condition = condition,
                "inline fragment condition never matches parent type, skipping"
            );
            Ok(())
        }
    }

    /// Hands selections conditioned on `condition` to every concrete type of the abstract parent
    /// they apply to.
    fn distribute<'s>(
        &self,
        parent_type: &str,
        condition: &str,
        items: impl IntoIterator<Item = &'s Selection> + Clone,
        collected: &mut Collected<'s>,
    ) {
        for possible_type in self.schema.possible_types(parent_type) {
            if self.schema.type_applies(condition, possible_type) {
                collected
                    .branches
                    .entry(possible_type.clone())
                    .or_default()
                    .extend(items.clone());
            }
        }
    }

    fn ensure_type_condition(&self, type_name: &str) -> Result<(), ProjectionError> {
        match self.schema.definition(type_name) {
            Some(_) => Ok(()),
            None => Err(ProjectionError::TypeConditionNotFound {
                type_name: type_name.to_string(),
            }),
        }
    }

    pub(crate) fn fragment_reference(
        &self,
        fragment: &FragmentDefinition,
        pinned_type: Option<&str>,
    ) -> FragmentReference {
        FragmentReference {
            fragment: fragment.name.clone(),
            output_name: self.fragment_type_name(&fragment.name, pinned_type),
            type_condition: fragment.type_condition.clone(),
            pinned_type: pinned_type.map(str::to_string),
        }
    }
}
