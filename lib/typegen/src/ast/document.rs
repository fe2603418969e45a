use std::fmt::Display;

use graphql_parser::query as parser;
use serde::{Deserialize, Serialize};

use crate::{
    ast::{fragment::FragmentDefinition, operation::OperationDefinition},
    utils::pretty_display::PrettyDisplay,
};

/// An executable document: every operation and fragment it defines, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub operations: Vec<OperationDefinition>,
    pub fragments: Vec<FragmentDefinition>,
}

impl Document {
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments.iter().find(|fragment| fragment.name == name)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for operation in &self.operations {
            writeln!(f, "{}", operation)?;
        }

        for fragment in &self.fragments {
            writeln!(f, "{}", fragment)?;
        }

        Ok(())
    }
}

impl PrettyDisplay for Document {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        for operation in &self.operations {
            operation.pretty_fmt(f, depth)?;
        }

        for fragment in &self.fragments {
            fragment.pretty_fmt(f, depth)?;
        }

        Ok(())
    }
}

impl From<&parser::Document<'_, String>> for Document {
    fn from(document: &parser::Document<'_, String>) -> Self {
        let mut operations = vec![];
        let mut fragments = vec![];

        for definition in &document.definitions {
            match definition {
                parser::Definition::Operation(operation) => operations.push(operation.into()),
                parser::Definition::Fragment(fragment) => fragments.push(fragment.into()),
            }
        }

        Document {
            operations,
            fragments,
        }
    }
}
