use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

const DOCX_BODY: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

pub(crate) fn extract_docx(path: &Path) -> Result<String> {
    let mut archive = open_archive(path)?;
    let xml = read_entry(&mut archive, DOCX_BODY)?;
    let paragraphs = paragraph_texts(&xml, b"w:t", b"w:p")?;
    Ok(paragraphs.join("\n"))
}

pub(crate) fn extract_pptx(path: &Path) -> Result<String> {
    let mut archive = open_archive(path)?;
    let mut slides = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|number| (number, name.to_string())))
        .collect::<Vec<_>>();
    slides.sort();

    let mut lines = Vec::new();
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name)?;
        lines.extend(paragraph_texts(&xml, b"a:t", b"a:p")?);
    }
    Ok(lines.join("\n"))
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    ZipArchive::new(BufReader::new(file)).with_context(|| "failed to read zip archive")
}

fn read_entry(archive: &mut ZipArchive<BufReader<File>>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .with_context(|| format!("missing zip entry: {}", name))?;
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .with_context(|| format!("failed to read zip entry: {}", name))?;
    Ok(data)
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(PPTX_SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Text of every non-empty paragraph, with the runs inside each paragraph
/// concatenated.
fn paragraph_texts(xml: &[u8], text_tag: &[u8], paragraph_tag: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(Cursor::new(xml));
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut in_text = false;
    let mut current = String::new();
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == text_tag {
                    in_text = true;
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if name.as_ref() == text_tag {
                    in_text = false;
                } else if name.as_ref() == paragraph_tag {
                    push_paragraph(&mut paragraphs, &mut current);
                }
            }
            Ok(Event::Empty(e)) => {
                // Tabs and line breaks inside a paragraph separate words.
                if matches!(e.name().as_ref(), b"w:tab" | b"w:br" | b"a:br") {
                    current.push(' ');
                }
            }
            Ok(Event::Text(e)) => {
                if in_text {
                    current.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if in_text {
                    current.push_str(&String::from_utf8_lossy(e.into_inner().as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(anyhow!("failed to parse xml: {}", err)),
        }
        buf.clear();
    }
    push_paragraph(&mut paragraphs, &mut current);
    Ok(paragraphs)
}

fn push_paragraph(paragraphs: &mut Vec<String>, current: &mut String) {
    let text = std::mem::take(current);
    if !text.trim().is_empty() {
        paragraphs.push(text.trim().to_string());
    }
}
