use std::fmt::Display;

use graphql_parser::query as parser;
use serde::{Deserialize, Serialize};

use crate::{
    ast::{
        selection_set::{convert_directives, write_directives, Directive, SelectionSet},
        value::Value,
    },
    schema::{type_node::TypeNode, OperationKind},
    utils::pretty_display::{get_indent, PrettyDisplay},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub name: Option<String>,
    pub operation_kind: OperationKind,
    pub variable_definitions: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

impl OperationDefinition {
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

impl Display for OperationDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operation_kind)?;

        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }

        if !self.variable_definitions.is_empty() {
            write!(f, "(")?;
            for (i, variable_definition) in self.variable_definitions.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", variable_definition)?;
            }
            write!(f, ")")?;
        }

        write_directives(f, &self.directives)?;
        write!(f, " {}", self.selection_set)
    }
}

impl PrettyDisplay for OperationDefinition {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        match &self.name {
            Some(name) => writeln!(f, "{indent}{} {} {{", self.operation_kind, name)?,
            None => writeln!(f, "{indent}{} {{", self.operation_kind)?,
        }
        self.selection_set.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub variable_type: TypeNode,
    pub default_value: Option<Value>,
}

impl Display for VariableDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.default_value {
            Some(default_value) => {
                write!(f, "${}: {} = {}", self.name, self.variable_type, default_value)
            }
            None => write!(f, "${}: {}", self.name, self.variable_type),
        }
    }
}

impl From<&parser::VariableDefinition<'_, String>> for VariableDefinition {
    fn from(value: &parser::VariableDefinition<'_, String>) -> Self {
        VariableDefinition {
            name: value.name.clone(),
            variable_type: (&value.var_type).into(),
            default_value: value.default_value.as_ref().map(|v| v.into()),
        }
    }
}

fn convert_variables(
    variable_definitions: &[parser::VariableDefinition<'_, String>],
) -> Vec<VariableDefinition> {
    variable_definitions.iter().map(|v| v.into()).collect()
}

impl From<&parser::OperationDefinition<'_, String>> for OperationDefinition {
    fn from(value: &parser::OperationDefinition<'_, String>) -> Self {
        match value {
            parser::OperationDefinition::Query(query) => OperationDefinition {
                name: query.name.clone(),
                operation_kind: OperationKind::Query,
                variable_definitions: convert_variables(&query.variable_definitions),
                directives: convert_directives(&query.directives),
                selection_set: (&query.selection_set).into(),
            },
            parser::OperationDefinition::SelectionSet(s) => OperationDefinition {
                name: None,
                operation_kind: OperationKind::Query,
                variable_definitions: vec![],
                directives: vec![],
                selection_set: s.into(),
            },
            parser::OperationDefinition::Mutation(mutation) => OperationDefinition {
                name: mutation.name.clone(),
                operation_kind: OperationKind::Mutation,
                variable_definitions: convert_variables(&mutation.variable_definitions),
                directives: convert_directives(&mutation.directives),
                selection_set: (&mutation.selection_set).into(),
            },
            parser::OperationDefinition::Subscription(subscription) => OperationDefinition {
                name: subscription.name.clone(),
                operation_kind: OperationKind::Subscription,
                variable_definitions: convert_variables(&subscription.variable_definitions),
                directives: convert_directives(&subscription.directives),
                selection_set: (&subscription.selection_set).into(),
            },
        }
    }
}
