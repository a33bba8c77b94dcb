//! Collects the latest successful build of every configuration and groups them by project.
//!
//! Only the configuration listing is fatal. A configuration whose build lookup, build detail
//! or artifact listing fails is left out of the result.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};

use crate::errors::{AggregationError, FetchError};
use crate::models::{
    sort_build_types, ArtifactFile, ArtifactList, Build, BuildList, BuildType, BuildTypeList,
    Project, ProjectBuild,
};
use crate::teamcity::{fetch_json, Upstream};

pub fn build_types_path(project: Option<&str>) -> String {
    match project {
        Some(project) => format!(
            "/app/rest/buildTypes?locator=affectedProject:(id:{})",
            project
        ),
        None => "/app/rest/buildTypes".to_string(),
    }
}

pub fn latest_build_path(build_type_id: &str, branch: &str) -> String {
    format!(
        "/app/rest/buildTypes/id:{}/builds?locator=branch:{},state:finished,status:SUCCESS,count:1",
        build_type_id, branch
    )
}

pub fn artifacts_path(build_id: u64) -> String {
    format!("/app/rest/builds/id:{}/artifacts/children", build_id)
}

pub struct Aggregator<U: ?Sized> {
    upstream: Arc<U>,
    branch: String,
    project: Option<String>,
    concurrency: usize,
}

impl<U: Upstream + ?Sized> Aggregator<U> {
    pub fn new(upstream: Arc<U>, branch: impl Into<String>) -> Self {
        Self {
            upstream,
            branch: branch.into(),
            project: None,
            concurrency: 1,
        }
    }

    /// Restricts the listing to configurations below this top level project.
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }

    /// Number of configurations resolved at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Projects in order of first appearance among the sorted configurations. Projects whose
    /// configurations all failed to resolve are still returned, with no builds.
    pub async fn collect(&self) -> Result<Vec<Project>, AggregationError> {
        let mut types = self.build_types().await?;
        sort_build_types(&mut types);
        tracing::debug!(count = types.len(), "Listed build configurations");

        // `buffered` yields in input order, so the sort survives the fan-out.
        let resolved: Vec<(BuildType, Option<Build>)> = stream::iter(types)
            .map(|build_type| async move {
                let build = self.resolve(&build_type).await;
                (build_type, build)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut projects: Vec<Project> = Vec::new();
        let mut project_index: HashMap<String, usize> = HashMap::new();

        for (build_type, build) in resolved {
            let idx = *project_index
                .entry(build_type.project_name.clone())
                .or_insert_with(|| {
                    projects.push(Project::new(build_type.project_name.clone()));
                    projects.len() - 1
                });

            if let Some(build) = build {
                projects[idx].builds.push(ProjectBuild { build_type, build });
            }
        }

        Ok(projects)
    }

    async fn build_types(&self) -> Result<Vec<BuildType>, AggregationError> {
        let path = build_types_path(self.project.as_deref());
        let list: BuildTypeList = fetch_json(self.upstream.as_ref(), &path)
            .await
            .map_err(AggregationError::ListBuildTypes)?;
        Ok(list.build_types)
    }

    async fn resolve(&self, build_type: &BuildType) -> Option<Build> {
        let mut build = match self.latest_build(&build_type.id).await {
            Ok(Some(build)) => build,
            Ok(None) => {
                tracing::debug!(build_type = %build_type.id, branch = %self.branch, "No successful build found");
                return None;
            }
            Err(e) => {
                tracing::debug!(build_type = %build_type.id, error = %e, "Build lookup failed");
                return None;
            }
        };

        match self.files(build.id).await {
            Ok(files) => {
                build.files = files;
                Some(build)
            }
            Err(e) => {
                tracing::debug!(build_type = %build_type.id, build_id = build.id, error = %e, "Artifact listing failed");
                None
            }
        }
    }

    /// The single latest successful build on the branch, re-fetched through its `href` since
    /// list entries are abbreviated. Anything but exactly one match counts as not found.
    async fn latest_build(&self, build_type_id: &str) -> Result<Option<Build>, FetchError> {
        let path = latest_build_path(build_type_id, &self.branch);
        let list: BuildList = fetch_json(self.upstream.as_ref(), &path).await?;

        let summary = match list.builds.as_slice() {
            [only] => only,
            _ => return Ok(None),
        };

        let build: Build = fetch_json(self.upstream.as_ref(), &summary.href).await?;
        Ok(Some(build))
    }

    async fn files(&self, build_id: u64) -> Result<Vec<ArtifactFile>, FetchError> {
        let list: ArtifactList = fetch_json(self.upstream.as_ref(), &artifacts_path(build_id)).await?;
        Ok(list.files)
    }
}
