use std::fmt::{Debug, Display};

use graphql_parser::query::{
    Directive as ParserDirective, Selection as ParserSelection, SelectionSet as ParserSelectionSet,
    TypeCondition,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::utils::pretty_display::{get_indent, PrettyDisplay};

use super::{selection_item::Selection, value::Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Names of every fragment spread reachable from this selection set, through nested
    /// fields and inline fragments, in document order and without repetition.
    pub fn fragment_spreads(&self) -> Vec<&str> {
        let mut names = IndexSet::new();
        self.collect_fragment_spreads(&mut names);
        names.into_iter().collect()
    }

    fn collect_fragment_spreads<'a>(&'a self, names: &mut IndexSet<&'a str>) {
        for item in &self.items {
            match item {
                Selection::Field(field) => field.selections.collect_fragment_spreads(names),
                Selection::FragmentSpread(spread) => {
                    names.insert(spread.fragment_name.as_str());
                }
                Selection::InlineFragment(fragment) => {
                    fragment.selections.collect_fragment_spreads(names)
                }
            }
        }
    }
}

impl Display for SelectionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.items.is_empty() {
            return Ok(());
        }

        write!(f, "{{")?;

        write!(
            f,
            "{}",
            self.items
                .iter()
                .map(|v| format!("{}", v))
                .collect::<Vec<_>>()
                .join(" ")
        )?;

        write!(f, "}}")
    }
}

impl PrettyDisplay for SelectionSet {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        for item in &self.items {
            item.pretty_fmt(f, depth)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, Value)>,
}

impl Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.name)?;
        write_arguments(f, &self.arguments)
    }
}

pub(crate) fn write_arguments(
    f: &mut std::fmt::Formatter<'_>,
    arguments: &[(String, Value)],
) -> std::fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }

    write!(f, "(")?;
    for (i, (name, value)) in arguments.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", name, value)?;
    }
    write!(f, ")")
}

pub(crate) fn write_directives(
    f: &mut std::fmt::Formatter<'_>,
    directives: &[Directive],
) -> std::fmt::Result {
    for directive in directives {
        write!(f, " {}", directive)?;
    }

    Ok(())
}

pub(crate) fn has_directive(directives: &[Directive], name: &str) -> bool {
    directives.iter().any(|directive| directive.name == name)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Vec<(String, Value)>,
    pub directives: Vec<Directive>,
    pub selections: SelectionSet,
}

impl FieldSelection {
    pub fn is_leaf(&self) -> bool {
        self.selections.is_empty()
    }

    /// The key this field answers under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_typename(&self) -> bool {
        self.name == "__typename"
    }
}

impl Display for FieldSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "{}: ", alias)?;
        }
        write!(f, "{}", self.name)?;
        write_arguments(f, &self.arguments)?;
        write_directives(f, &self.directives)?;
        write!(f, "{}", self.selections)
    }
}

impl PrettyDisplay for FieldSelection {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        write!(f, "{indent}")?;
        if let Some(alias) = &self.alias {
            write!(f, "{}: ", alias)?;
        }
        write!(f, "{}", self.name)?;
        write_arguments(f, &self.arguments)?;
        write_directives(f, &self.directives)?;

        if self.selections.is_empty() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        self.selections.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpreadSelection {
    pub fragment_name: String,
    pub directives: Vec<Directive>,
}

impl Display for FragmentSpreadSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "...{}", self.fragment_name)?;
        write_directives(f, &self.directives)
    }
}

impl PrettyDisplay for FragmentSpreadSelection {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        writeln!(f, "{}{}", get_indent(depth), self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InlineFragmentSelection {
    pub type_condition: Option<String>,
    pub directives: Vec<Directive>,
    pub selections: SelectionSet,
}

impl InlineFragmentSelection {
    pub fn is_deferred(&self) -> bool {
        has_directive(&self.directives, "defer")
    }
}

impl Display for InlineFragmentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "...")?;
        if let Some(type_condition) = &self.type_condition {
            write!(f, " on {}", type_condition)?;
        }
        write_directives(f, &self.directives)?;
        write!(f, "{}", self.selections)
    }
}

impl PrettyDisplay for InlineFragmentSelection {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = get_indent(depth);
        write!(f, "{indent}...")?;
        if let Some(type_condition) = &self.type_condition {
            write!(f, " on {}", type_condition)?;
        }
        write_directives(f, &self.directives)?;
        writeln!(f, " {{")?;
        self.selections.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}}")
    }
}

impl From<&ParserDirective<'_, String>> for Directive {
    fn from(directive: &ParserDirective<'_, String>) -> Self {
        Directive {
            name: directive.name.to_string(),
            arguments: directive
                .arguments
                .iter()
                .map(|(name, value)| (name.to_string(), value.into()))
                .collect(),
        }
    }
}

pub(crate) fn convert_directives(directives: &[ParserDirective<'_, String>]) -> Vec<Directive> {
    directives.iter().map(Directive::from).collect()
}

pub(crate) fn extract_type_condition(type_condition: &TypeCondition<'_, String>) -> String {
    match type_condition {
        TypeCondition::On(v) => v.to_string(),
    }
}

impl From<&ParserSelectionSet<'_, String>> for SelectionSet {
    fn from(parser_selection_set: &ParserSelectionSet<'_, String>) -> Self {
        SelectionSet {
            items: parser_selection_set
                .items
                .iter()
                .map(|parser_selection_item| parser_selection_item.into())
                .collect(),
        }
    }
}

impl From<&ParserSelection<'_, String>> for Selection {
    fn from(parser_selection: &ParserSelection<'_, String>) -> Self {
        match parser_selection {
            ParserSelection::Field(field) => Selection::Field(FieldSelection {
                name: field.name.to_string(),
                alias: field.alias.as_ref().map(|alias| alias.to_string()),
                arguments: field
                    .arguments
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.into()))
                    .collect(),
                directives: convert_directives(&field.directives),
                selections: (&field.selection_set).into(),
            }),
            ParserSelection::FragmentSpread(spread) => {
                Selection::FragmentSpread(FragmentSpreadSelection {
                    fragment_name: spread.fragment_name.to_string(),
                    directives: convert_directives(&spread.directives),
                })
            }
            ParserSelection::InlineFragment(inline_fragment) => {
                Selection::InlineFragment(InlineFragmentSelection {
                    type_condition: inline_fragment
                        .type_condition
                        .as_ref()
                        .map(extract_type_condition),
                    directives: convert_directives(&inline_fragment.directives),
                    selections: (&inline_fragment.selection_set).into(),
                })
            }
        }
    }
}
