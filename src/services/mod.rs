pub mod cleanup;
pub mod node;
pub mod project;
pub mod snippet;
pub mod structure;
