use serde::Deserialize;

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ArtifactContent {
    #[serde(default)]
    pub href: String,
}

/// One entry of a build's top-level artifact directory.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content: ArtifactContent,
}

impl ArtifactFile {
    pub fn size_str(&self) -> String {
        format_size(self.size)
    }

    pub fn download_url(&self, base: &str) -> String {
        format!("{}{}", base, self.content.href)
    }
}

#[derive(Debug, Deserialize)]
pub struct ArtifactList {
    #[serde(rename = "file", default)]
    pub files: Vec<ArtifactFile>,
}

/// KiB with one decimal below one MiB, MiB with two decimals from there on.
pub fn format_size(bytes: u64) -> String {
    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    }
}
