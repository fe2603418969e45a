use super::OperationKind;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Schema does not define a query root type")]
    MissingQueryType,
    #[error("Root type '{type_name}' for {operation_kind} operations is not defined in the schema")]
    UnknownRootType {
        operation_kind: OperationKind,
        type_name: String,
    },
}
