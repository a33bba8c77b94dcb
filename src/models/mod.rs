mod artifact;
mod build;
mod build_type;
mod project;
mod snapshot;

pub use artifact::{format_size, ArtifactContent, ArtifactFile, ArtifactList};
pub use build::{Build, BuildList};
pub use build_type::{sort_build_types, BuildType, BuildTypeList};
pub use project::{Project, ProjectBuild};
pub use snapshot::Snapshot;
