pub mod display;
pub mod modifiers;

use serde::{Deserialize, Serialize};

/// Structural description of a shape of data, independent of any target language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum TypeExpression {
    Record(Record),
    /// The named parent type narrowed to a set of its primitive fields.
    Pick(NamedPick),
    Union(Vec<TypeExpression>),
    Intersection(Vec<TypeExpression>),
    Array(ArrayType),
    Nullable(Box<TypeExpression>),
    FragmentReference(FragmentReference),
    /// A type known to Emission by name: scalar outputs, enums, mappers, placeholders.
    Named(String),
    /// A string literal type, used for `__typename` discriminants.
    Literal(String),
    /// A part of the shape delivered incrementally (`@defer`).
    Deferred(Box<TypeExpression>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    pub optional: bool,
    pub value: TypeExpression,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedPick {
    pub parent: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: Box<TypeExpression>,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentReference {
    pub fragment: String,
    pub output_name: String,
    pub type_condition: String,
    /// Set when the reference stands for the fragment's variant on one concrete type.
    pub pinned_type: Option<String>,
}

impl Record {
    pub fn new(fields: Vec<RecordField>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl RecordField {
    pub fn new(name: impl Into<String>, optional: bool, value: TypeExpression) -> Self {
        Self {
            name: name.into(),
            optional,
            value,
        }
    }
}

impl TypeExpression {
    pub fn empty_record() -> Self {
        TypeExpression::Record(Record::default())
    }

    pub fn record(fields: Vec<RecordField>) -> Self {
        TypeExpression::Record(Record::new(fields))
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpression::Named(name.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        TypeExpression::Literal(value.into())
    }

    pub fn nullable(inner: TypeExpression) -> Self {
        TypeExpression::Nullable(Box::new(inner))
    }

    pub fn array(element: TypeExpression, readonly: bool) -> Self {
        TypeExpression::Array(ArrayType {
            element: Box::new(element),
            readonly,
        })
    }

    pub fn is_empty_record(&self) -> bool {
        matches!(self, TypeExpression::Record(record) if record.fields.is_empty())
    }

    /// Combines parts structurally. Nested intersections are flattened, repeated parts are kept
    /// once and empty records only survive when nothing else is left.
    pub fn intersection(parts: Vec<TypeExpression>) -> Self {
        let mut flattened: Vec<TypeExpression> = Vec::with_capacity(parts.len());

        for part in parts {
            match part {
                TypeExpression::Intersection(inner) => {
                    for inner_part in inner {
                        push_unique(&mut flattened, inner_part);
                    }
                }
                other => push_unique(&mut flattened, other),
            }
        }

        if flattened.len() > 1 {
            flattened.retain(|part| !part.is_empty_record());
        }

        match flattened.len() {
            0 => TypeExpression::empty_record(),
            1 => flattened.remove(0),
            _ => TypeExpression::Intersection(flattened),
        }
    }

    /// Disjoint alternatives. A single alternative collapses to itself.
    pub fn union(alternatives: Vec<TypeExpression>) -> Self {
        let mut flattened: Vec<TypeExpression> = Vec::with_capacity(alternatives.len());

        for alternative in alternatives {
            match alternative {
                TypeExpression::Union(inner) => {
                    for inner_alternative in inner {
                        push_unique(&mut flattened, inner_alternative);
                    }
                }
                other => push_unique(&mut flattened, other),
            }
        }

        match flattened.len() {
            0 => TypeExpression::named("never"),
            1 => flattened.remove(0),
            _ => TypeExpression::Union(flattened),
        }
    }

    /// Every fragment reference inside this expression, in order of first appearance.
    pub fn fragment_references(&self) -> Vec<&FragmentReference> {
        let mut references = Vec::new();
        self.collect_fragment_references(&mut references);
        references
    }

    fn collect_fragment_references<'a>(&'a self, references: &mut Vec<&'a FragmentReference>) {
        match self {
            TypeExpression::FragmentReference(reference) => {
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }
            TypeExpression::Record(record) => {
                for field in &record.fields {
                    field.value.collect_fragment_references(references);
                }
            }
            TypeExpression::Union(parts) | TypeExpression::Intersection(parts) => {
                for part in parts {
                    part.collect_fragment_references(references);
                }
            }
            TypeExpression::Array(array) => array.element.collect_fragment_references(references),
            TypeExpression::Nullable(inner) | TypeExpression::Deferred(inner) => {
                inner.collect_fragment_references(references)
            }
            TypeExpression::Pick(_) | TypeExpression::Named(_) | TypeExpression::Literal(_) => {}
        }
    }
}

fn push_unique(parts: &mut Vec<TypeExpression>, part: TypeExpression) {
    if !parts.contains(&part) {
        parts.push(part);
    }
}
