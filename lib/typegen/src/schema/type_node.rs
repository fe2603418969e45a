use std::fmt::{Debug, Display};

use graphql_parser::schema as input;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeNode {
    List(Box<TypeNode>),
    NonNull(Box<TypeNode>),
    Named(String),
}

/// One layer of a wrapped type reference, listed outermost first by [`TypeNode::modifiers`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Modifier {
    List,
    NonNull,
}

impl TypeNode {
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeNode::NonNull(_))
    }

    pub fn is_nullable(&self) -> bool {
        !self.is_non_null()
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeNode::List(_) => true,
            TypeNode::NonNull(inner) => inner.as_ref().is_list(),
            TypeNode::Named(_) => false,
        }
    }

    pub fn inner_type(&self) -> &str {
        match self {
            TypeNode::List(inner) => inner.as_ref().inner_type(),
            TypeNode::NonNull(inner) => inner.as_ref().inner_type(),
            TypeNode::Named(name) => name,
        }
    }

    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        let mut current = self;

        loop {
            match current {
                TypeNode::List(inner) => {
                    modifiers.push(Modifier::List);
                    current = inner;
                }
                TypeNode::NonNull(inner) => {
                    modifiers.push(Modifier::NonNull);
                    current = inner;
                }
                TypeNode::Named(_) => return modifiers,
            }
        }
    }

    /// Rebuilds a type reference from a base name and an outermost-first modifier stack.
    pub fn from_modifiers(base: impl Into<String>, modifiers: &[Modifier]) -> TypeNode {
        modifiers
            .iter()
            .rev()
            .fold(TypeNode::Named(base.into()), |inner, modifier| match modifier {
                Modifier::List => TypeNode::List(Box::new(inner)),
                Modifier::NonNull => TypeNode::NonNull(Box::new(inner)),
            })
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::List(inner) => write!(f, "[{}]", inner),
            TypeNode::NonNull(inner) => write!(f, "{}!", inner),
            TypeNode::Named(name) => write!(f, "{}", name),
        }
    }
}

impl<'a, T: input::Text<'a>> From<&input::Type<'a, T>> for TypeNode {
    fn from(input_type: &input::Type<'a, T>) -> Self {
        match input_type {
            input::Type::ListType(inner) => TypeNode::List(Box::new(inner.as_ref().into())),
            input::Type::NonNullType(inner) => TypeNode::NonNull(Box::new(inner.as_ref().into())),
            input::Type::NamedType(name) => TypeNode::Named(name.as_ref().to_string()),
        }
    }
}

impl TryFrom<&str> for TypeNode {
    type Error = &'static str;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err("type reference cannot be empty");
        }

        if let Some(inner) = s.strip_suffix('!') {
            return Ok(TypeNode::NonNull(Box::new(TypeNode::try_from(inner)?)));
        }

        if let Some(inner) = s.strip_prefix('[') {
            return match inner.strip_suffix(']') {
                Some(inner) => Ok(TypeNode::List(Box::new(TypeNode::try_from(inner)?))),
                None => Err("unbalanced list brackets in type reference"),
            };
        }

        if s.contains(['[', ']', '!']) {
            return Err("unexpected modifier inside a named type");
        }

        Ok(TypeNode::Named(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_wrapped_references() {
        let node = TypeNode::try_from("[[User!]]!").unwrap();
        assert_eq!(node.to_string(), "[[User!]]!");
        assert_eq!(node.inner_type(), "User");
        assert!(node.is_list());
        assert!(node.is_non_null());
        assert_eq!(
            node.modifiers(),
            vec![
                Modifier::NonNull,
                Modifier::List,
                Modifier::List,
                Modifier::NonNull
            ]
        );
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(TypeNode::try_from("").is_err());
        assert!(TypeNode::try_from("[User").is_err());
        assert!(TypeNode::try_from("Us!er").is_err());
    }

    #[test]
    fn modifier_stack_rebuilds_the_same_reference() {
        for source in ["ID", "ID!", "[ID]", "[ID!]!", "[[ID]!]"] {
            let node = TypeNode::try_from(source).unwrap();
            let rebuilt = TypeNode::from_modifiers(node.inner_type(), &node.modifiers());
            assert_eq!(rebuilt, node);
        }
    }
}
