use std::sync::{Arc, Mutex};

use crate::engine::{EngineFuture, InferenceError, TranslationEngine};
use crate::settings::{Settings, builtin_settings};

/// Built-in settings with every model id rewritten to `m/<pair>`.
pub(crate) fn test_settings() -> Settings {
    let mut settings = builtin_settings().expect("builtin settings");
    for (key, model) in settings.models.iter_mut() {
        *model = format!("m/{}", key);
    }
    settings
}

/// Engine stub that echoes `[<pair>:<text>]` and records every call.
#[derive(Clone, Default)]
pub(crate) struct RecordingEngine {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    failing_model: Option<String>,
}

impl RecordingEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(model: &str) -> Self {
        Self {
            failing_model: Some(model.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl TranslationEngine for RecordingEngine {
    fn translate(&self, model: &str, text: &str) -> EngineFuture {
        self.calls
            .lock()
            .expect("calls lock")
            .push((model.to_string(), text.to_string()));
        let result = if self.failing_model.as_deref() == Some(model) {
            Err(InferenceError::Response {
                model: model.to_string(),
                message: "stub failure".to_string(),
            })
        } else {
            let label = model.strip_prefix("m/").unwrap_or(model);
            Ok(format!("[{}:{}]", label, text))
        };
        Box::pin(async move { result })
    }
}

fn zip_bytes(entries: &[(String, String)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::FileOptions;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(name.as_str(), FileOptions::default())
            .expect("start zip entry");
        writer.write_all(content.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Minimal docx whose body holds one paragraph per item (items are XML text).
pub(crate) fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text))
        .collect::<String>();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );
    zip_bytes(&[("word/document.xml".to_string(), document)])
}

/// Minimal pptx with one text box per `(slide number, text)`.
pub(crate) fn pptx_bytes(slides: &[(u32, &str)]) -> Vec<u8> {
    let entries = slides
        .iter()
        .map(|(number, text)| {
            let xml = format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
                 <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
                 xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
                 <p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p>\
                 </p:txBody></p:sp></p:spTree></p:cSld></p:sld>",
                text
            );
            (format!("ppt/slides/slide{}.xml", number), xml)
        })
        .collect::<Vec<_>>();
    zip_bytes(&entries)
}

/// Minimal single-sheet xlsx; every cell is a shared string.
pub(crate) fn xlsx_bytes(rows: &[(&str, &str)]) -> Vec<u8> {
    let mut strings = Vec::new();
    let mut sheet_rows = String::new();
    for (index, (left, right)) in rows.iter().enumerate() {
        let row = index + 1;
        let left_id = strings.len();
        strings.push(*left);
        let right_id = strings.len();
        strings.push(*right);
        sheet_rows.push_str(&format!(
            "<row r=\"{row}\"><c r=\"A{row}\" t=\"s\"><v>{left_id}</v></c>\
             <c r=\"B{row}\" t=\"s\"><v>{right_id}</v></c></row>"
        ));
    }
    let shared = strings
        .iter()
        .map(|value| format!("<si><t>{}</t></si>", value))
        .collect::<String>();
    let main_ns = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    let rel_ns = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    zip_bytes(&[
        (
            "[Content_Types].xml".to_string(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
             <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
             <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
             <Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\
             <Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>\
             </Types>"
                .to_string(),
        ),
        (
            "_rels/.rels".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
                 <Relationship Id=\"rId1\" Type=\"{rel_ns}/officeDocument\" Target=\"xl/workbook.xml\"/>\
                 </Relationships>"
            ),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <workbook xmlns=\"{main_ns}\" xmlns:r=\"{rel_ns}\">\
                 <sheets><sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>"
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
                 <Relationship Id=\"rId1\" Type=\"{rel_ns}/worksheet\" Target=\"worksheets/sheet1.xml\"/>\
                 <Relationship Id=\"rId2\" Type=\"{rel_ns}/sharedStrings\" Target=\"sharedStrings.xml\"/>\
                 </Relationships>"
            ),
        ),
        (
            "xl/sharedStrings.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <sst xmlns=\"{main_ns}\" count=\"{count}\" uniqueCount=\"{count}\">{shared}</sst>",
                count = strings.len()
            ),
        ),
        (
            "xl/worksheets/sheet1.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <worksheet xmlns=\"{main_ns}\"><sheetData>{sheet_rows}</sheetData></worksheet>"
            ),
        ),
    ])
}

/// Single-page PDF showing `text` in Helvetica, with a correct xref table.
pub(crate) fn pdf_bytes(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (index, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, object).as_bytes());
    }
    let xref = out.len();
    out.extend_from_slice(
        format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
    );
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    out
}
