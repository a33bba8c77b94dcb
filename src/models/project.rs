use super::build::Build;
use super::build_type::BuildType;

/// A build configuration together with its latest successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBuild {
    pub build_type: BuildType,
    pub build: Build,
}

/// Build configurations sharing a `projectName`, in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub builds: Vec<ProjectBuild>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            builds: Vec::new(),
        }
    }

    /// URL-safe identifier used as the page anchor.
    pub fn anchor(&self) -> String {
        self.name.replace(' ', "-")
    }

    /// Builds that produced at least one artifact.
    pub fn visible_builds(&self) -> impl Iterator<Item = &ProjectBuild> {
        self.builds.iter().filter(|b| !b.build.files.is_empty())
    }

    pub fn is_visible(&self) -> bool {
        self.visible_builds().next().is_some()
    }
}
