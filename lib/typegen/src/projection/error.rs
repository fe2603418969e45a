use crate::schema::OperationKind;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Field '{field_name}' not found in type '{type_name}'")]
    FieldNotFound {
        field_name: String,
        type_name: String,
    },
    #[error("Fragment '{fragment_name}' is not defined")]
    FragmentNotFound { fragment_name: String },
    #[error("Type condition '{type_name}' does not name a type of the schema")]
    TypeConditionNotFound { type_name: String },
    #[error("Response key '{response_key}' in type '{type_name}' is used by different fields")]
    FieldMergeConflict {
        response_key: String,
        type_name: String,
    },
    #[error("Type '{type_name}' is not defined in the schema")]
    UnknownType { type_name: String },
    #[error("Type '{type_name}' has no selectable fields")]
    NotCompositeType { type_name: String },
    #[error("Schema has no root type for {operation_kind} operations")]
    MissingRootType { operation_kind: OperationKind },
}
