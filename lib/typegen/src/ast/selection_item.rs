use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

use crate::utils::pretty_display::PrettyDisplay;

use super::selection_set::{FieldSelection, FragmentSpreadSelection, InlineFragmentSelection};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind")]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread(FragmentSpreadSelection),
    InlineFragment(InlineFragmentSelection),
}

impl Selection {
    pub fn as_field(&self) -> Option<&FieldSelection> {
        match self {
            Selection::Field(field) => Some(field),
            _ => None,
        }
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Field(field_selection) => write!(f, "{}", field_selection),
            Selection::FragmentSpread(spread) => write!(f, "{}", spread),
            Selection::InlineFragment(fragment_selection) => {
                write!(f, "{}", fragment_selection)
            }
        }
    }
}

impl PrettyDisplay for Selection {
    fn pretty_fmt(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        match self {
            Selection::Field(field_selection) => field_selection.pretty_fmt(f, depth),
            Selection::FragmentSpread(spread) => spread.pretty_fmt(f, depth),
            Selection::InlineFragment(fragment_selection) => {
                fragment_selection.pretty_fmt(f, depth)
            }
        }
    }
}
