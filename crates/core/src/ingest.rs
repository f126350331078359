use crate::models::{BatchFailure, FailureKind, ResumeInput};
use crate::IngestError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "text"];

pub fn discover_resume_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect::<Vec<_>>();

    files.sort_unstable();
    files
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

pub fn read_text_document(path: &Path) -> Result<String, IngestError> {
    let name = display_name(path);
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        });
    if !supported {
        return Err(IngestError::InputFormat {
            item: name,
            reason: format!(
                "unsupported file format (supported: {})",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        });
    }

    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| IngestError::InputFormat {
        item: name.clone(),
        reason: "file is not valid UTF-8 text".to_string(),
    })?;

    if text.trim().is_empty() {
        return Err(IngestError::InputFormat {
            item: name,
            reason: "no text content".to_string(),
        });
    }

    Ok(text)
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl From<SkippedFile> for BatchFailure {
    fn from(skipped: SkippedFile) -> Self {
        BatchFailure {
            index: None,
            filename: display_name(&skipped.path),
            kind: FailureKind::InputFormat,
            reason: skipped.reason,
        }
    }
}

#[derive(Debug)]
pub struct ResumeLoadReport {
    pub resumes: Vec<ResumeInput>,
    pub skipped_files: Vec<SkippedFile>,
}

pub fn load_resume_folder(folder: &Path) -> Result<ResumeLoadReport, IngestError> {
    let files = discover_resume_files(folder);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no files found in {}",
            folder.display()
        )));
    }

    let mut resumes = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        match read_text_document(&path) {
            Ok(text) => {
                let mut resume = ResumeInput::new(text).with_filename(display_name(&path));
                resume.metadata.insert(
                    "source_path".to_string(),
                    Value::String(path.to_string_lossy().to_string()),
                );
                resumes.push(resume);
            }
            Err(error) => skipped_files.push(SkippedFile {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(ResumeLoadReport {
        resumes,
        skipped_files,
    })
}
