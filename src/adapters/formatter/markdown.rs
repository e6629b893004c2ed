//! Markdown document and HTML rendering of finished reports.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::sections::{SectionMap, MANDATORY_SECTIONS};
use crate::domain::models::CompanyInfo;
use crate::domain::ports::ReportFormatter;

pub const REPORT_TITLE: &str = "AI ASSESSMENT AND CONSULTATION";

const SMALL_WORDS: [&str; 17] = [
    "of", "and", "for", "the", "in", "on", "at", "to", "a", "an", "as", "but", "or", "nor", "with",
    "by", "from",
];

/// Maturity scale appended to every rendered report.
const MATURITY_LEVELS: [(&str, &str); 3] = [
    (
        "Low",
        "Companies in early stages of AI integration or development, typically in the ideation phase \
         with limited data, resources and expertise. AI is minimally or not used in workflows, with no \
         data management processes or AI roadmap.",
    ),
    (
        "Moderate",
        "Companies beyond the proof of concept stage with functional solutions. AI is partially or fully \
         integrated into workflows with established or developing data management processes and an AI roadmap.",
    ),
    (
        "High",
        "Companies with advanced AI products and an established customer base. They need help with specific \
         technical details or with new AI applications on top of existing solutions.",
    ),
];

#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Build the full markdown document.
    pub fn to_markdown(&self, artifact: &str, company: &CompanyInfo) -> String {
        let sections = SectionMap::parse(artifact);
        let mut doc = format!("# {REPORT_TITLE}\n\n");
        for (label, value) in company.labelled_fields() {
            let _ = writeln!(doc, "**{label}:** {value}  ");
        }

        for name in MANDATORY_SECTIONS {
            let Some(content) = sections.get(name) else {
                continue;
            };
            let body = section_body(content);
            if body.is_empty() {
                continue;
            }
            let _ = write!(doc, "\n## {}\n\n{body}\n", format_title_case(name));
        }

        doc.push_str("\n---\n\n### AI Maturity Levels\n\n");
        for (level, text) in MATURITY_LEVELS {
            let _ = writeln!(doc, "**{level}:** {text}\n");
        }
        doc
    }
}

/// Section text without its heading line.
fn section_body(content: &str) -> &str {
    content
        .split_once('\n')
        .map_or("", |(_, rest)| rest)
        .trim()
}

/// Title case that keeps short joining words lowercase and `AI` uppercase.
pub fn format_title_case(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if lower == "ai" {
                "AI".to_string()
            } else if i > 0 && SMALL_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                let mut chars = lower.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// File-system safe company name: drop everything except alphanumerics,
/// `_`, `-` and whitespace, then turn spaces into underscores.
pub fn safe_file_stem(company_name: &str) -> String {
    let kept: String = company_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let stem = kept.trim().replace(' ', "_");
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Replace `**bold**` pairs with `<strong>` tags. An unmatched marker is kept.
fn bold_to_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match after.find("**") {
            Some(end) if end > 0 => {
                out.push_str(&rest[..start]);
                let _ = write!(out, "<strong>{}</strong>", &after[..end]);
                rest = &after[end + 2..];
            }
            _ => break,
        }
    }
    out.push_str(rest);
    out
}

fn flush_paragraph(html: &mut String, paragraph: &mut Vec<&str>) {
    if !paragraph.is_empty() {
        let _ = write!(html, "<p>{}</p>", bold_to_html(&escape_html(&paragraph.join(" "))));
        paragraph.clear();
    }
}

fn flush_bullets(html: &mut String, bullets: &mut Vec<String>) {
    if !bullets.is_empty() {
        html.push_str("<ul>");
        for item in bullets.drain(..) {
            let _ = write!(html, "<li>{}</li>", bold_to_html(&escape_html(&item)));
        }
        html.push_str("</ul>");
    }
}

/// Paragraphs and single-level bullet lists.
fn body_to_html(body: &str) -> String {
    let mut html = String::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut bullets: Vec<String> = Vec::new();

    for line in body.lines().map(str::trim) {
        if let Some(item) = line.strip_prefix("- ") {
            flush_paragraph(&mut html, &mut paragraph);
            bullets.push(item.trim().to_string());
        } else if line.is_empty() {
            flush_paragraph(&mut html, &mut paragraph);
            flush_bullets(&mut html, &mut bullets);
        } else if let Some(last) = bullets.last_mut() {
            last.push(' ');
            last.push_str(line);
        } else {
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut html, &mut paragraph);
    flush_bullets(&mut html, &mut bullets);
    html
}

#[async_trait]
impl ReportFormatter for MarkdownFormatter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    async fn render(
        &self,
        artifact: &str,
        company: &CompanyInfo,
        output_dir: &Path,
    ) -> DomainResult<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            DomainError::FormatterFailed(format!("cannot create {}: {e}", output_dir.display()))
        })?;
        let path = output_dir.join(format!("{}.md", safe_file_stem(&company.company_name)));
        tokio::fs::write(&path, self.to_markdown(artifact, company))
            .await
            .map_err(|e| {
                DomainError::FormatterFailed(format!("cannot write {}: {e}", path.display()))
            })?;
        tracing::info!(path = %path.display(), "report document written");
        Ok(path)
    }

    fn render_html(&self, artifact: &str, company: &CompanyInfo) -> DomainResult<String> {
        let sections = SectionMap::parse(artifact);
        let mut html = format!("<div class=\"report\">\n<h1>{REPORT_TITLE}</h1>\n<div class=\"company-info\">\n");
        for (label, value) in company.labelled_fields() {
            let _ = writeln!(html, "<p><strong>{label}:</strong> {}</p>", escape_html(value));
        }
        html.push_str("</div>\n");

        for name in MANDATORY_SECTIONS {
            let Some(content) = sections.get(name) else {
                continue;
            };
            let body = section_body(content);
            if body.is_empty() {
                continue;
            }
            let _ = writeln!(
                html,
                "<div class=\"section\">\n<h3>{}</h3>\n{}\n</div>",
                format_title_case(name),
                body_to_html(body)
            );
        }

        html.push_str("<hr>\n<div class=\"maturity-levels\">\n<h4>AI Maturity Levels:</h4>\n");
        for (level, text) in MATURITY_LEVELS {
            let _ = writeln!(html, "<p><strong>{level}:</strong> {text}</p>");
        }
        html.push_str("</div>\n</div>\n");
        Ok(html)
    }
}
