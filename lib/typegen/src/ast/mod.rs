pub mod document;
pub mod fragment;
pub mod operation;
pub mod selection_item;
pub mod selection_set;
pub mod value;
