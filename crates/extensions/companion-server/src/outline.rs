//! Markdown outline of received transcripts.

use std::cmp::Ordering;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tracing::info;

use bite_protocols::ContentPayload;

use crate::error::ServerError;

/// Render a content push as
///
/// ```text
/// # <label>
///
/// ## <key>
///
/// <text>
///
/// ```
///
/// Sections are ordered by label, numerically when labels are numbers. With
/// `keys` empty every subsection is rendered; otherwise only `keys`, in that
/// order, skipping ones a section lacks.
pub fn render_outline(payload: &ContentPayload, keys: &[String]) -> String {
    let mut sections: Vec<_> = payload.entries.iter().collect();
    sections.sort_by(|(a, _), (b, _)| compare_labels(a, b));

    let mut out = String::new();
    for (label, section) in sections {
        out.push_str(&format!("# {}\n\n", label));
        let selected: Vec<(&String, &String)> = if keys.is_empty() {
            section.texts.iter().collect()
        } else {
            keys.iter()
                .filter_map(|k| section.texts.get_key_value(k))
                .collect()
        };
        for (key, text) in selected {
            out.push_str(&format!("## {}\n\n{}\n\n", key, text));
        }
    }
    out
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Where rendered outlines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineSink {
    /// Append to a file, creating it if needed.
    File(PathBuf),
    /// Log at INFO.
    Log,
}

impl OutlineSink {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map_or(OutlineSink::Log, OutlineSink::File)
    }

    pub async fn write(&self, outline: &str) -> Result<(), ServerError> {
        match self {
            OutlineSink::File(path) => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await?;
                file.write_all(outline.as_bytes()).await?;
                file.flush().await?;
                Ok(())
            }
            OutlineSink::Log => {
                info!("Received transcript:\n{}", outline);
                Ok(())
            }
        }
    }
}
