use serde::Deserialize;

/// A TeamCity build configuration, as listed by `/app/rest/buildTypes`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    pub id: String,
    pub name: String,
    pub project_name: String,
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildTypeList {
    #[serde(rename = "buildType", default)]
    pub build_types: Vec<BuildType>,
}

/// Orders configurations by project name, then configuration name.
pub fn sort_build_types(types: &mut [BuildType]) {
    types.sort_by(|a, b| {
        a.project_name
            .cmp(&b.project_name)
            .then_with(|| a.name.cmp(&b.name))
    });
}
