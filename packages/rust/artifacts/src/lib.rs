//! Rendering and writing of the final recon report.
//!
//! A [`ReportDocument`] is rendered into each requested [`ReportFormat`] and
//! written next to a `<domain>_report.json` run manifest carrying checksums.
//! Every file is staged under a temp name first and only renamed into place
//! once all of them are written, so a failed write leaves no report behind.

mod html;
mod markdown;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use reconreport_shared::{
    ArtifactMeta, ReconReportError, ReportDocument, ReportFormat, Result, RunManifest,
};

/// Render `doc` in the given format.
pub fn render(doc: &ReportDocument, format: ReportFormat) -> String {
    match format {
        ReportFormat::Html => html::render(doc),
        ReportFormat::Markdown => markdown::render(doc),
    }
}

/// Paths and checksums produced by [`write_report`].
#[derive(Debug, Clone)]
pub struct WrittenReport {
    /// Rendered documents, in the order the formats were requested.
    pub documents: Vec<PathBuf>,
    /// The run manifest sidecar.
    pub manifest_path: PathBuf,
    /// Checksums of the rendered documents.
    pub artifacts: Vec<ArtifactMeta>,
}

/// Render `doc` in every format and write it, then the manifest, into `output_dir`.
///
/// The manifest's `artifacts` list is replaced by the checksums of the
/// documents just written. Duplicate formats are written once.
///
/// All files are staged as temp files before any is renamed into place. If
/// staging or any rename fails, every temp file and every target already
/// renamed by this call is removed.
#[instrument(skip_all, fields(domain = %doc.domain, output_dir = %output_dir.display()))]
pub fn write_report(
    output_dir: &Path,
    doc: &ReportDocument,
    formats: &[ReportFormat],
    mut manifest: RunManifest,
) -> Result<WrittenReport> {
    if formats.is_empty() {
        return Err(ReconReportError::validation(
            "at least one output format is required",
        ));
    }

    std::fs::create_dir_all(output_dir)
        .map_err(|e| ReconReportError::output_write(output_dir, e))?;

    let mut documents = Vec::with_capacity(formats.len());
    let mut artifacts = Vec::with_capacity(formats.len());
    let mut staged = Vec::with_capacity(formats.len() + 1);

    for &format in formats {
        let target = doc.domain.document_path(output_dir, format);
        if documents.contains(&target) {
            continue;
        }

        let content = render(doc, format);
        if let Err(e) = stage(&target, content.as_bytes(), &mut staged) {
            discard(&staged);
            return Err(e);
        }

        let meta = ArtifactMeta {
            filename: file_name(&target),
            sha256: sha256_hex(content.as_bytes()),
            size_bytes: content.len(),
        };
        debug!(file = %meta.filename, size = meta.size_bytes, "staged report document");

        artifacts.push(meta);
        documents.push(target);
    }

    manifest.artifacts = artifacts.clone();
    let manifest_path = doc.domain.manifest_path(output_dir);
    let staged_manifest = serde_json::to_string_pretty(&manifest)
        .map_err(|e| ReconReportError::validation(format!("manifest serialization failed: {e}")))
        .and_then(|json| stage(&manifest_path, json.as_bytes(), &mut staged));
    if let Err(e) = staged_manifest {
        discard(&staged);
        return Err(e);
    }

    commit(&staged)?;

    info!(
        documents = documents.len(),
        manifest = %manifest_path.display(),
        "report written"
    );

    Ok(WrittenReport {
        documents,
        manifest_path,
        artifacts,
    })
}

/// A temp file waiting to be renamed over its target.
struct Staged {
    temp: PathBuf,
    target: PathBuf,
}

/// Write `content` to `.<name>.tmp` next to `target`.
fn stage(target: &Path, content: &[u8], staged: &mut Vec<Staged>) -> Result<()> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let temp = dir.join(format!(".{}.tmp", file_name(target)));

    if let Err(e) = std::fs::write(&temp, content) {
        let _ = std::fs::remove_file(&temp);
        return Err(ReconReportError::output_write(&temp, e));
    }

    staged.push(Staged {
        temp,
        target: target.to_path_buf(),
    });
    Ok(())
}

/// Rename every staged file into place, rolling back on the first failure.
fn commit(staged: &[Staged]) -> Result<()> {
    for (i, file) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(&file.temp, &file.target) {
            warn!(target = %file.target.display(), error = %e, "rename failed, rolling back report");
            for done in &staged[..i] {
                let _ = std::fs::remove_file(&done.target);
            }
            discard(&staged[i..]);
            return Err(ReconReportError::output_write(&file.target, e));
        }
    }
    Ok(())
}

fn discard(staged: &[Staged]) {
    for file in staged {
        let _ = std::fs::remove_file(&file.temp);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconreport_shared::{
        CURRENT_SCHEMA_VERSION, ChunkStats, Domain, ExtractedRow, RunId,
    };

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rr-artifacts-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_doc() -> ReportDocument {
        ReportDocument {
            title: "AI-Powered Reconnaissance Report".into(),
            domain: Domain::parse("example.com").unwrap(),
            ip_address: "93.184.216.34".into(),
            rows: vec![
                ExtractedRow::new("Target", "example.com"),
                ExtractedRow::new("IP", "93.184.216.34"),
            ],
            tools: vec!["whois".into(), "nmap".into()],
            disclaimer: "Always cross-verify manually.".into(),
        }
    }

    fn make_manifest() -> RunManifest {
        RunManifest {
            schema_version: CURRENT_SCHEMA_VERSION,
            run_id: RunId::new(),
            domain: Domain::parse("example.com").unwrap(),
            model: "llama3-70b-8192".into(),
            tool_version: "0.1.0".into(),
            generated_at: chrono::Utc::now(),
            chunks: ChunkStats {
                total: 1,
                completed: 1,
                skipped: 0,
                empty: 0,
            },
            row_count: 2,
            extracted_tools: vec![],
            artifacts: vec![],
        }
    }

    #[test]
    fn render_dispatches_by_format() {
        let doc = make_doc();
        assert!(render(&doc, ReportFormat::Html).starts_with("<!DOCTYPE html>"));
        assert!(render(&doc, ReportFormat::Markdown).starts_with("# AI-Powered"));
    }

    #[test]
    fn writes_documents_and_manifest() {
        let tmp = temp_dir();
        let written = write_report(
            &tmp,
            &make_doc(),
            &[ReportFormat::Html, ReportFormat::Markdown],
            make_manifest(),
        )
        .unwrap();

        assert_eq!(
            written.documents,
            vec![
                tmp.join("example.com_report.html"),
                tmp.join("example.com_report.md")
            ]
        );
        for path in &written.documents {
            assert!(path.exists());
        }
        assert_eq!(written.manifest_path, tmp.join("example.com_report.json"));

        let json = std::fs::read_to_string(&written.manifest_path).unwrap();
        let manifest: RunManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(manifest.artifacts.len(), 2);
        assert_eq!(manifest.artifacts[0].filename, "example.com_report.html");
        assert_eq!(manifest.artifacts[0].sha256.len(), 64);
        assert_eq!(manifest.row_count, 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn checksum_matches_file_content() {
        let tmp = temp_dir();
        let written =
            write_report(&tmp, &make_doc(), &[ReportFormat::Markdown], make_manifest()).unwrap();

        let bytes = std::fs::read(&written.documents[0]).unwrap();
        assert_eq!(written.artifacts[0].sha256, sha256_hex(&bytes));
        assert_eq!(written.artifacts[0].size_bytes, bytes.len());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let tmp = temp_dir();
        write_report(&tmp, &make_doc(), &[ReportFormat::Html], make_manifest()).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(&tmp)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rewrite_overwrites_previous_report() {
        let tmp = temp_dir();
        write_report(&tmp, &make_doc(), &[ReportFormat::Markdown], make_manifest()).unwrap();

        let mut doc = make_doc();
        doc.ip_address = "N/A".into();
        write_report(&tmp, &doc, &[ReportFormat::Markdown], make_manifest()).unwrap();

        let md = std::fs::read_to_string(tmp.join("example.com_report.md")).unwrap();
        assert!(md.contains("**IP Address:** N/A"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn duplicate_formats_written_once() {
        let tmp = temp_dir();
        let written = write_report(
            &tmp,
            &make_doc(),
            &[ReportFormat::Html, ReportFormat::Html],
            make_manifest(),
        )
        .unwrap();
        assert_eq!(written.documents.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_format_list_rejected() {
        let tmp = temp_dir();
        let err = write_report(&tmp, &make_doc(), &[], make_manifest()).unwrap_err();
        assert!(matches!(err, ReconReportError::Validation { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_rename_rolls_back_earlier_documents() {
        let tmp = temp_dir();
        // A non-empty directory at the Markdown target makes its rename fail.
        std::fs::create_dir_all(tmp.join("example.com_report.md").join("x")).unwrap();

        let err = write_report(
            &tmp,
            &make_doc(),
            &[ReportFormat::Html, ReportFormat::Markdown],
            make_manifest(),
        )
        .unwrap_err();

        assert!(matches!(err, ReconReportError::OutputWrite { .. }));
        assert!(!tmp.join("example.com_report.html").exists());
        assert!(!tmp.join("example.com_report.json").exists());
        let leftovers: Vec<_> = std::fs::read_dir(&tmp)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unwritable_output_is_output_write_error() {
        let tmp = temp_dir();
        let blocker = tmp.join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_report(&blocker, &make_doc(), &[ReportFormat::Html], make_manifest())
            .unwrap_err();
        assert!(matches!(err, ReconReportError::OutputWrite { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
