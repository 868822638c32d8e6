//! Intermediate representation handed to the execution engine.

mod condition;
mod field;

pub use condition::{
    Comparator, ConditionKind, ConditionNode, JoiningOperator, Predicate, decode_in_list,
    encode_in_list,
};
pub use field::{
    Aggregation, ConditionalFunction, FieldDescriptor, FieldList, OrderDirection,
};
