use std::fmt::Display;

use super::{FragmentReference, NamedPick, Record, TypeExpression};

impl Display for TypeExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpression::Record(record) => write!(f, "{}", record),
            TypeExpression::Pick(pick) => write!(f, "{}", pick),
            TypeExpression::Union(alternatives) => {
                write!(f, "(")?;
                write_joined(f, alternatives, " | ")?;
                write!(f, ")")
            }
            TypeExpression::Intersection(parts) => write_joined(f, parts, " & "),
            TypeExpression::Array(array) if array.readonly => {
                write!(f, "ReadonlyArray<{}>", array.element)
            }
            TypeExpression::Array(array) => write!(f, "Array<{}>", array.element),
            TypeExpression::Nullable(inner) => write!(f, "Maybe<{}>", inner),
            TypeExpression::FragmentReference(reference) => write!(f, "{}", reference),
            TypeExpression::Named(name) => write!(f, "{}", name),
            TypeExpression::Literal(value) => write!(f, "'{}'", value),
            TypeExpression::Deferred(inner) => write!(f, "Incremental<{}>", inner),
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{{}}");
        }

        write!(f, "{{ ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            let marker = if field.optional { "?" } else { "" };
            write!(f, "{}{}: {}", field.name, marker, field.value)?;
        }
        write!(f, " }}")
    }
}

impl Display for NamedPick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pick<{}, ", self.parent)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "'{}'", field)?;
        }
        write!(f, ">")
    }
}

impl Display for FragmentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pinned_type {
            Some(pinned_type) => write!(f, "FragmentRef<'{}', '{}'>", self.fragment, pinned_type),
            None => write!(f, "FragmentRef<'{}'>", self.fragment),
        }
    }
}

fn write_joined(
    f: &mut std::fmt::Formatter<'_>,
    parts: &[TypeExpression],
    separator: &str,
) -> std::fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", part)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ir::{FragmentReference, NamedPick, RecordField, TypeExpression};

    #[test]
    fn prints_every_variant() {
        let expr = TypeExpression::Intersection(vec![
            TypeExpression::record(vec![RecordField::new(
                "__typename",
                true,
                TypeExpression::literal("User"),
            )]),
            TypeExpression::Pick(NamedPick {
                parent: "User".to_string(),
                fields: vec!["id".to_string(), "name".to_string()],
            }),
            TypeExpression::Union(vec![
                TypeExpression::FragmentReference(FragmentReference {
                    fragment: "F".to_string(),
                    output_name: "FFragment".to_string(),
                    type_condition: "Node".to_string(),
                    pinned_type: Some("User".to_string()),
                }),
                TypeExpression::empty_record(),
            ]),
            TypeExpression::Deferred(Box::new(TypeExpression::nullable(TypeExpression::array(
                TypeExpression::named("string"),
                true,
            )))),
        ]);

        insta::assert_snapshot!(expr, @"{ __typename?: 'User' } & Pick<User, 'id' | 'name'> & (FragmentRef<'F', 'User'> | {}) & Incremental<Maybe<ReadonlyArray<string>>>");
    }
}
