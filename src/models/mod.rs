pub mod node;
pub mod project;
pub mod share;
pub mod snippet;

pub use node::{
    CreatedNode, FileNode, NodeKind, ProjectNode, StructureChanges, UpdatedNode, build_tree,
    is_temp_id,
};
pub use project::Project;
pub use share::{AccessMode, ExpiresIn, generate_share_id};
pub use snippet::Snippet;
