//! Data-driven field mapping rules and the mapper that applies them.

mod mapper;
mod rules;

pub use mapper::{FieldMapper, MappingTemplate};
pub use rules::{
    FieldMappingRule, ENTITY_RULES, META_RULES, PRICE_RULES, QUOTE_RULES, TIME_RULES,
};
