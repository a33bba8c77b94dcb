use std::fmt::{self, Write};

use chrono::{DateTime, Utc};

use crate::models::Project;

const STYLE: &str = "body {
	margin: 4em;
}
h1, h2, h3 {
	margin-bottom: 0.5em;
}
hr {
	margin-top: 1.5em;
	margin-bottom: 1.5em;
}
.size, .text-muted {
	color: #6c757d;
}
";

/// Everything the page shows for one refresh cycle.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub branch: &'a str,
    pub base: &'a str,
    pub title: Option<&'a str>,
    pub projects: &'a [Project],
    pub generated_at: DateTime<Utc>,
}

impl PageContext<'_> {
    pub fn title(&self) -> String {
        match self.title {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Latest builds of {}", self.branch),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the build listing. Projects without a single artifact are left out.
pub fn render_page(ctx: &PageContext<'_>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let title = escape_html(&ctx.title());
    let visible: Vec<&Project> = ctx.projects.iter().filter(|p| p.is_visible()).collect();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{}</title>", title)?;
    writeln!(out, "<style type=\"text/css\">\n{}</style>", STYLE)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    match ctx.title {
        Some(custom) if !custom.is_empty() => writeln!(out, "<h1>{}</h1>", title)?,
        _ => writeln!(
            out,
            "<h1>Latest builds of <code>{}</code></h1>",
            escape_html(ctx.branch)
        )?,
    }

    if visible.len() > 1 {
        writeln!(out, "<ul>")?;
        for project in &visible {
            writeln!(
                out,
                "<li><a href=\"#{}\">{}</a></li>",
                escape_html(&project.anchor()),
                escape_html(&project.name)
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    for (idx, project) in visible.iter().enumerate() {
        if idx > 0 {
            writeln!(out, "<hr>")?;
        }
        render_project(&mut out, ctx, project)?;
    }

    writeln!(out, "<hr>")?;
    writeln!(
        out,
        "<p class=\"text-muted\">Generated {}.</p>",
        ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}

fn render_project(out: &mut String, ctx: &PageContext<'_>, project: &Project) -> fmt::Result {
    writeln!(
        out,
        "<h2 id=\"{}\">{}</h2>",
        escape_html(&project.anchor()),
        escape_html(&project.name)
    )?;

    let several = project.builds.len() > 1;
    for entry in project.visible_builds() {
        let build = &entry.build;
        if several {
            writeln!(out, "<h4>{}</h4>", escape_html(&entry.build_type.name))?;
        }
        writeln!(
            out,
            "<h5>Build <a href=\"{}\">#{}</a></h5>",
            escape_html(&build.web_url),
            escape_html(&build.number)
        )?;
        writeln!(out, "<p>")?;
        writeln!(out, "Status: {}<br>", escape_html(&build.status_text))?;
        writeln!(out, "Completed: {}<br>", escape_html(&build.finished_str()))?;
        writeln!(out, "</p>")?;

        writeln!(out, "<ul>")?;
        for file in &build.files {
            writeln!(
                out,
                "<li><a href=\"{}\">{}</a> <span class=\"size\">({})</span></li>",
                escape_html(&file.download_url(ctx.base)),
                escape_html(&file.name),
                file.size_str()
            )?;
        }
        writeln!(out, "</ul>")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{ArtifactContent, ArtifactFile, Build, BuildType, ProjectBuild};

    fn build_type(name: &str, project: &str) -> BuildType {
        BuildType {
            id: name.to_lowercase(),
            name: name.to_string(),
            project_name: project.to_string(),
            project_id: project.to_string(),
        }
    }

    fn build(number: &str, files: &[(&str, u64)]) -> Build {
        Build {
            id: 1,
            build_type_id: String::new(),
            number: number.to_string(),
            state: "finished".to_string(),
            status_text: "Tests passed: 12".to_string(),
            branch_name: "master".to_string(),
            finish_date: "20240131T235959+0100".to_string(),
            href: String::new(),
            web_url: "https://ci.example.com/viewLog.html?buildId=1&tab=artifacts".to_string(),
            files: files
                .iter()
                .map(|(name, size)| ArtifactFile {
                    name: name.to_string(),
                    size: *size,
                    content: ArtifactContent {
                        href: format!("/guestAuth/repository/download/{}", name),
                    },
                })
                .collect(),
        }
    }

    fn project(name: &str, builds: Vec<(&str, Build)>) -> Project {
        Project {
            name: name.to_string(),
            builds: builds
                .into_iter()
                .map(|(bt, build)| ProjectBuild {
                    build_type: build_type(bt, name),
                    build,
                })
                .collect(),
        }
    }

    fn render(projects: &[Project], title: Option<&str>) -> String {
        render_page(&PageContext {
            branch: "main",
            base: "https://ci.example.com",
            title,
            projects,
            generated_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn renders_build_details_and_downloads() {
        let projects = vec![project(
            "Syncthing Core",
            vec![("Linux", build("1.27.3", &[("st.tar.gz", 1_500_000)]))],
        )];

        let page = render(&projects, None);

        assert!(page.contains("<title>Latest builds of main</title>"));
        assert!(page.contains("<h2 id=\"Syncthing-Core\">Syncthing Core</h2>"));
        assert!(page.contains("#1.27.3</a>"));
        assert!(page.contains("buildId=1&amp;tab=artifacts"));
        assert!(page.contains("Completed: 2024-01-31 22:59:59 UTC"));
        assert!(page.contains(
            "<a href=\"https://ci.example.com/guestAuth/repository/download/st.tar.gz\">st.tar.gz</a>"
        ));
        assert!(page.contains("(1.43 MiB)"));
        assert!(page.contains("Generated 2024-02-01 08:00:00 UTC."));
        // A single build is not labelled with its configuration name.
        assert!(!page.contains("<h4>Linux</h4>"));
    }

    #[test]
    fn projects_without_artifacts_are_omitted() {
        let projects = vec![
            project("Empty", vec![("Docs", build("1", &[]))]),
            project("No Builds", vec![]),
            project(
                "Full",
                vec![
                    ("Linux", build("2", &[("a.zip", 512)])),
                    ("Windows", build("3", &[])),
                ],
            ),
        ];

        let page = render(&projects, None);

        assert!(!page.contains("Empty"));
        assert!(!page.contains("No Builds"));
        assert!(page.contains("<h4>Linux</h4>"));
        assert!(!page.contains("<h4>Windows</h4>"));
        assert!(page.contains("(0.5 KiB)"));
    }

    #[test]
    fn every_class_used_has_a_style_rule() {
        let projects = vec![project("Core", vec![("Linux", build("1", &[("a.zip", 1)]))])];
        let page = render(&projects, None);

        let classes: Vec<&str> = page
            .split("class=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert!(classes.contains(&"text-muted"));
        assert!(classes.contains(&"size"));
        for class in classes {
            assert!(STYLE.contains(&format!(".{}", class)), "no rule for {}", class);
        }
    }

    #[test]
    fn custom_title_is_escaped() {
        let page = render(&[], Some("Nightlies <beta>"));
        assert!(page.contains("<title>Nightlies &lt;beta&gt;</title>"));
        assert!(page.contains("<h1>Nightlies &lt;beta&gt;</h1>"));
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">'&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
