use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Plain text of every page.
///
/// Parsed in-process with `pdf-extract`. When that fails and poppler's
/// `pdftotext` or mupdf's `mutool` is installed, the tool gets a second try.
pub(crate) fn extract_pdf(path: &Path) -> Result<String> {
    let err = match pdf_extract::extract_text(path) {
        Ok(text) => return Ok(normalize_page_breaks(&text)),
        Err(err) => anyhow!("failed to parse pdf: {:?}", err),
    };
    match extract_with_tool(path) {
        Some(Ok(text)) => {
            warn!("{:#}; used external tool instead", err);
            Ok(text)
        }
        Some(Err(tool_err)) => {
            debug!("external pdf tool failed: {:#}", tool_err);
            Err(err)
        }
        None => Err(err),
    }
}

fn extract_with_tool(path: &Path) -> Option<Result<String>> {
    let command = if command_exists("pdftotext") {
        let mut command = Command::new("pdftotext");
        command.arg("-enc").arg("UTF-8").arg(path).arg("-");
        command
    } else if command_exists("mutool") {
        let mut command = Command::new("mutool");
        command
            .arg("draw")
            .arg("-q")
            .arg("-F")
            .arg("txt")
            .arg("-o")
            .arg("-")
            .arg(path);
        command
    } else {
        return None;
    };
    Some(run_tool(command))
}

fn run_tool(mut command: Command) -> Result<String> {
    let program = command.get_program().to_string_lossy().to_string();
    let output = command
        .output()
        .with_context(|| format!("failed to run {}", program))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("{} failed: {}", program, stderr.trim()));
    }
    Ok(normalize_page_breaks(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

// Page breaks come out as form feeds.
fn normalize_page_breaks(text: &str) -> String {
    text.replace('\u{c}', "\n")
}

pub(crate) fn command_exists(cmd: &str) -> bool {
    let path = Path::new(cmd);
    if path.components().count() > 1 {
        return path.is_file();
    }
    let Some(path_var) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path_var).any(|dir| {
        let candidate = dir.join(cmd);
        if candidate.is_file() {
            return true;
        }
        cfg!(windows) && dir.join(format!("{}.exe", cmd)).is_file()
    })
}
