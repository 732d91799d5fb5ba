pub mod fields;
pub mod pipeline;
