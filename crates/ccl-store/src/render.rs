//! Word document rendering.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use docx_rs::{Docx, Paragraph, Run};

use ccl_core::{Error, MergedFieldMap, Result};

fn text_paragraph(text: impl Into<String>) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn bold_paragraph(text: impl Into<String>) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold())
}

/// Render the `.docx` bytes for one matter.
///
/// Layout: bold title, generation timestamp, the letter one paragraph per
/// line, then a "Merged fields" appendix holding the pretty-printed map.
pub fn render_docx(
    matter_id: &str,
    fields: &MergedFieldMap,
    letter: &str,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let mut docx = Docx::new()
        .add_paragraph(bold_paragraph(format!("Client Care Letter – {}", matter_id)))
        .add_paragraph(text_paragraph(format!(
            "Generated {}",
            generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )));

    for line in letter.lines() {
        docx = docx.add_paragraph(text_paragraph(line));
    }

    docx = docx.add_paragraph(bold_paragraph("Merged fields"));
    let snapshot = serde_json::to_string_pretty(fields)?;
    for line in snapshot.lines() {
        docx = docx.add_paragraph(text_paragraph(line));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| Error::Document(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Paragraph text of a rendered document, one line per paragraph.
#[cfg(test)]
pub(crate) fn document_text(data: &[u8]) -> String {
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    let docx = read_docx(data).expect("rendered document is readable");
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(
                para.children
                    .iter()
                    .filter_map(|pc| match pc {
                        ParagraphChild::Run(run) => Some(
                            run.children
                                .iter()
                                .filter_map(|rc| match rc {
                                    RunChild::Text(t) => Some(t.text.clone()),
                                    _ => None,
                                })
                                .collect::<String>(),
                        ),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
