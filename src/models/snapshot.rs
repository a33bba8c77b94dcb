use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Utc};

const PLACEHOLDER_PAGE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta http-equiv=\"refresh\" content=\"10\">
<title>Latest builds</title>
</head>
<body>
<p>The build list is being fetched. This page reloads shortly.</p>
</body>
</html>
";

/// One fully rendered page. Replaced as a whole, never edited.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub body: Vec<u8>,
    pub produced_at: DateTime<Utc>,
    pub content_hash: u64,
    placeholder: bool,
}

impl Snapshot {
    pub fn new(body: Vec<u8>) -> Self {
        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);

        Self {
            content_hash: hasher.finish(),
            body,
            produced_at: Utc::now(),
            placeholder: false,
        }
    }

    /// Served until the first refresh succeeds.
    pub fn placeholder() -> Self {
        Self {
            placeholder: true,
            ..Self::new(PLACEHOLDER_PAGE.as_bytes().to_vec())
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn etag(&self) -> String {
        format!("\"{:x}\"", self.content_hash)
    }

    /// The placeholder is always stale.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        if self.placeholder {
            return true;
        }
        let age = Utc::now().signed_duration_since(self.produced_at);
        age.to_std().map(|age| age > max_age).unwrap_or(false)
    }
}
