//! Turn statement files into [`SourceDocument`]s: `.txt` is read as is,
//! `.pdf` goes through `pdftotext -layout`.

use anyhow::{Context, Result, bail};
use ledgerline_ingest::SourceDocument;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

const EXTENSIONS: &[&str] = &["pdf", "txt"];

/// Expand the given paths (folders become their statement files). With no
/// paths, scan `default_folder`.
pub fn collect_inputs(paths: &[PathBuf], default_folder: &Path) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return statements_in(default_folder);
    }

    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            out.extend(statements_in(path)?);
        } else {
            out.push(path.clone());
        }
    }
    Ok(out)
}

fn statements_in(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        bail!("folder '{}' does not exist", folder.display());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(folder).with_context(|| format!("read {}", folder.display()))? {
        let path = entry?.path();
        if path.is_file() && has_statement_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_statement_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Password attempts per encrypted PDF before giving up on it.
pub const MAX_PASSWORD_ATTEMPTS: usize = 3;

/// Supplies passwords for encrypted PDFs that do not open with an empty one.
pub trait PasswordSource {
    /// Password for `file` on attempt `attempt` (0-based); `None` gives up.
    fn next_password(&mut self, file: &str, attempt: usize) -> Result<Option<String>>;

    /// The last password returned was not accepted.
    fn rejected(&mut self);
}

pub fn load_document(
    path: &Path,
    pdftotext: &str,
    password: Option<&str>,
    passwords: &mut dyn PasswordSource,
) -> Result<SourceDocument> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let text = if is_pdf(path) {
        which::which(pdftotext)
            .with_context(|| format!("{pdftotext} not found (install poppler-utils)"))?;
        unlock(&name, password, passwords, |pw| pdf_text(pdftotext, path, pw))?
    } else {
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    };
    Ok(SourceDocument::from_text(name, &text))
}

enum PdfText {
    Text(String),
    Locked,
}

/// A configured password is used as is. Otherwise try without one (many
/// statements use an empty user password), then ask `passwords`.
fn unlock(
    name: &str,
    password: Option<&str>,
    passwords: &mut dyn PasswordSource,
    mut extract: impl FnMut(Option<&str>) -> Result<PdfText>,
) -> Result<String> {
    if let Some(pw) = password {
        return match extract(Some(pw))? {
            PdfText::Text(text) => Ok(text),
            PdfText::Locked => bail!("{name}: configured password was not accepted"),
        };
    }
    if let PdfText::Text(text) = extract(None)? {
        return Ok(text);
    }

    info!(file = name, "encrypted PDF, password required");
    for attempt in 0..MAX_PASSWORD_ATTEMPTS {
        let Some(pw) = passwords.next_password(name, attempt)? else {
            bail!("{name}: no password given for encrypted PDF");
        };
        match extract(Some(&pw))? {
            PdfText::Text(text) => return Ok(text),
            PdfText::Locked => {
                warn!(file = name, attempt = attempt + 1, "incorrect password");
                passwords.rejected();
            }
        }
    }
    bail!("{name}: maximum password attempts exceeded")
}

/// Run `pdftotext -layout [-upw PASSWORD] FILE -` and capture stdout.
fn pdf_text(command: &str, path: &Path, password: Option<&str>) -> Result<PdfText> {
    let mut cmd = Command::new(command);
    cmd.arg("-layout");
    if let Some(pw) = password {
        cmd.arg("-upw").arg(pw);
    }
    let output = cmd
        .arg(path)
        .arg("-")
        .output()
        .with_context(|| format!("running {command}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // poppler: "Command Line Error: Incorrect password"
        if stderr.to_ascii_lowercase().contains("password") {
            return Ok(PdfText::Locked);
        }
        bail!(
            "{command} failed on {} (exit {}): {}",
            path.display(),
            output.status.code().unwrap_or(-1),
            stderr.trim()
        );
    }

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        bail!("{} has no text layer (scanned PDF?)", path.display());
    }
    Ok(PdfText::Text(text))
}
