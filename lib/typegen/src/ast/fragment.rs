use std::fmt::Display;

use graphql_parser::query as parser;
use serde::{Deserialize, Serialize};

use crate::{
    ast::selection_set::{
        convert_directives, extract_type_condition, write_directives, Directive, SelectionSet,
    },
    utils::pretty_display::{get_indent, PrettyDisplay},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

impl FragmentDefinition {
    /// Names of the fragments spread anywhere inside this fragment's selection set.
    pub fn dependencies(&self) -> Vec<&str> {
        self.selection_set.fragment_spreads()
    }
}

impl Display for FragmentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fragment {} on {}", self.name, self.type_condition)?;
        write_directives(f, &self.directives)?;
        write!(f, " {}", self.selection_set)
    }
}

impl PrettyDisplay for FragmentDefinition {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        writeln!(
            f,
            "{indent}fragment {} on {} {{",
            self.name, self.type_condition
        )?;
        self.selection_set.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}}")
    }
}

impl From<&parser::FragmentDefinition<'_, String>> for FragmentDefinition {
    fn from(fragment: &parser::FragmentDefinition<'_, String>) -> Self {
        FragmentDefinition {
            name: fragment.name.to_string(),
            type_condition: extract_type_condition(&fragment.type_condition),
            directives: convert_directives(&fragment.directives),
            selection_set: (&fragment.selection_set).into(),
        }
    }
}
