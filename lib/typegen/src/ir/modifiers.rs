use crate::schema::type_node::{Modifier, TypeNode};

use super::TypeExpression;

/// Re-wraps a projected base shape with the List/NonNull layers of a schema type reference.
/// A missing NonNull becomes `Nullable`, a List becomes `Array`, outermost layer first.
pub fn wrap_type(base: TypeExpression, type_node: &TypeNode, readonly: bool) -> TypeExpression {
    match type_node {
        TypeNode::NonNull(inner) => wrap_non_null(base, inner, readonly),
        other => TypeExpression::nullable(wrap_non_null(base, other, readonly)),
    }
}

fn wrap_non_null(base: TypeExpression, type_node: &TypeNode, readonly: bool) -> TypeExpression {
    match type_node {
        TypeNode::List(inner) => TypeExpression::array(wrap_type(base, inner, readonly), readonly),
        TypeNode::NonNull(inner) => wrap_non_null(base, inner, readonly),
        TypeNode::Named(_) => base,
    }
}

/// Inverse of [`wrap_type`]: the innermost base shape and the outermost-first modifier stack.
pub fn unwrap_type(expr: &TypeExpression) -> (&TypeExpression, Vec<Modifier>) {
    let mut modifiers = Vec::new();
    let mut current = expr;

    loop {
        let inner = match current {
            TypeExpression::Nullable(inner) => inner.as_ref(),
            other => {
                modifiers.push(Modifier::NonNull);
                other
            }
        };

        match inner {
            TypeExpression::Array(array) => {
                modifiers.push(Modifier::List);
                current = array.element.as_ref();
            }
            base => return (base, modifiers),
        }
    }
}
