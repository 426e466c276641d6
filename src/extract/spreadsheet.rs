use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// Every sheet rendered row by row, cells separated by tabs.
pub(crate) fn extract_workbook(path: &Path) -> Result<String> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook: {}", path.display()))?;
    let mut lines = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("failed to read sheet: {}", name))?;
        for row in range.rows() {
            let cells = row
                .iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(|cell| cell.to_string())
                .filter(|value| !value.trim().is_empty())
                .collect::<Vec<_>>();
            if !cells.is_empty() {
                lines.push(cells.join("\t"));
            }
        }
    }
    Ok(lines.join("\n"))
}
