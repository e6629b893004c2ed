//! `reportloop render`: turn an artifact or a stored job into a deliverable.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use uuid::Uuid;

use super::{jobs_dir, read_text, CompanyArgs};
use crate::adapters::formatter::MarkdownFormatter;
use crate::adapters::job_store::FileJobStore;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::CompanyInfo;
use crate::domain::ports::{JobStore, ReportFormatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Markdown document written to the output directory
    #[default]
    Document,
    /// HTML fragment
    Html,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Report artifact file
    #[arg(required_unless_present = "job", conflicts_with = "job")]
    pub artifact: Option<PathBuf>,

    /// Render the report of a stored job instead
    #[arg(long)]
    pub job: Option<Uuid>,

    #[command(flatten)]
    pub company: CompanyArgs,

    #[arg(long, value_enum, default_value_t = RenderFormat::Document)]
    pub format: RenderFormat,

    /// Output directory (documents) or file (HTML; stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub format: &'static str,
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl CommandOutput for RenderOutput {
    fn to_human(&self) -> String {
        match (&self.path, &self.html) {
            (Some(path), _) => format!("Rendered {} to {}", self.format, path.display()),
            (None, Some(html)) => html.clone(),
            (None, None) => String::new(),
        }
    }
}

async fn load_job(job_id: Uuid) -> Result<(String, CompanyInfo)> {
    let store = FileJobStore::new(jobs_dir());
    let record = store
        .get(job_id)
        .await?
        .ok_or_else(|| anyhow!("Job not found: {job_id}"))?;
    let outcome = record
        .outcome
        .ok_or_else(|| anyhow!("Job {job_id} has not finished"))?;
    let artifact = match outcome.final_report {
        Some(report) => report.content,
        None => outcome
            .last_artifact
            .ok_or_else(|| anyhow!("Job {job_id} produced no report"))?,
    };
    Ok((artifact, record.company))
}

pub async fn execute(args: RenderArgs, json_mode: bool) -> Result<()> {
    let (artifact, company) = match (&args.artifact, args.job) {
        (Some(path), _) => (read_text(path).await?, args.company.resolve().await?),
        (None, Some(job_id)) => load_job(job_id).await?,
        (None, None) => bail!("Provide an artifact file or --job"),
    };

    let formatter = MarkdownFormatter::new();
    let out = match args.format {
        RenderFormat::Document => {
            let dir = args.output.unwrap_or_else(|| PathBuf::from("."));
            let path = formatter.render(&artifact, &company, &dir).await?;
            RenderOutput {
                format: "document",
                path: Some(path),
                html: None,
            }
        }
        RenderFormat::Html => {
            let html = formatter.render_html(&artifact, &company)?;
            match args.output {
                Some(path) => {
                    tokio::fs::write(&path, &html)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    RenderOutput {
                        format: "html",
                        path: Some(path),
                        html: None,
                    }
                }
                None => RenderOutput {
                    format: "html",
                    path: None,
                    html: Some(html),
                },
            }
        }
    };

    output(&out, json_mode);
    Ok(())
}
