// ── Large-deletion backup ─────────────────────────────────────────────────────
//
// When an edit shrinks the document by more than `LARGE_DELETION_CHARS`
// characters, the text as it was before the edit is written beside the
// document as `{stem}_backup_{NNNN}{.ext}`.  Suffix collisions are not
// checked.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::Rng;

use crate::error::{QuillError, Result};

/// Shrinkage (in characters) that must be exceeded before a backup is taken.
pub(crate) const LARGE_DELETION_CHARS: usize = 3000;

/// `true` when going from `previous` to `current` deletes more than
/// [`LARGE_DELETION_CHARS`] characters.
pub(crate) fn is_large_deletion(previous: &str, current: &str) -> bool {
    previous
        .chars()
        .count()
        .saturating_sub(current.chars().count())
        > LARGE_DELETION_CHARS
}

/// Backup location for `document` with the given four-digit `suffix`.
///
/// `notes.txt` → `notes_backup_0042.txt`; `notes` → `notes_backup_0042`.
pub(crate) fn backup_path(document: &Path, suffix: u16) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = document
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    document.with_file_name(format!("{stem}_backup_{suffix:04}{ext}"))
}

fn random_suffix() -> u16 {
    rand::thread_rng().gen_range(0..10_000)
}

/// Snapshot the previous content when an edit deletes too much.
///
/// Returns the path of the backup when one was written, `Ok(None)` when the
/// edit does not qualify or no document is active.
pub(crate) fn on_content_observed(
    previous: &str,
    current: &str,
    document: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let Some(document) = document else {
        return Ok(None);
    };
    if !is_large_deletion(previous, current) {
        return Ok(None);
    }

    let path = backup_path(document, random_suffix());
    fs::write(&path, previous).map_err(|source| QuillError::Backup {
        path: path.clone(),
        source,
    })?;
    tracing::info!(
        backup = %path.display(),
        chars = previous.chars().count(),
        "large deletion, previous content backed up"
    );
    Ok(Some(path))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn backups_in(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .expect("read_dir")
            .map(|e| e.expect("entry").path())
            .filter(|p| p.to_string_lossy().contains("_backup_"))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let prev = "x".repeat(3500);
        assert!(!is_large_deletion(&prev, &"x".repeat(500)));
        assert!(is_large_deletion(&prev, &"x".repeat(499)));
    }

    #[test]
    fn growth_is_never_a_deletion() {
        assert!(!is_large_deletion("", &"x".repeat(10_000)));
    }

    #[test]
    fn threshold_counts_characters() {
        // 3001 two-byte characters: 6002 bytes but only 3001 chars.
        let prev = "é".repeat(3001);
        assert!(is_large_deletion(&prev, ""));
        let prev = "é".repeat(3000);
        assert!(!is_large_deletion(&prev, ""));
    }

    #[test]
    fn backup_name_keeps_extension() {
        let p = backup_path(Path::new("/home/me/notes.txt"), 42);
        assert_eq!(p, PathBuf::from("/home/me/notes_backup_0042.txt"));
    }

    #[test]
    fn backup_name_without_extension() {
        let p = backup_path(Path::new("/home/me/notes"), 7);
        assert_eq!(p, PathBuf::from("/home/me/notes_backup_0007"));
    }

    #[test]
    fn backup_name_only_splits_last_extension() {
        let p = backup_path(Path::new("draft.v2.md"), 9999);
        assert_eq!(p, PathBuf::from("draft.v2_backup_9999.md"));
    }

    #[test]
    fn large_deletion_writes_exactly_one_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("story.txt");
        let prev = "a".repeat(4000);

        let written = on_content_observed(&prev, "a", Some(&doc))
            .expect("backup")
            .expect("a backup path");

        let found = backups_in(dir.path());
        assert_eq!(found, vec![written.clone()]);
        assert_eq!(fs::read_to_string(&written).expect("read"), prev);

        let name = written.file_name().expect("name").to_string_lossy().into_owned();
        assert!(name.starts_with("story_backup_"));
        assert!(name.ends_with(".txt"));
        let digits = &name["story_backup_".len()..name.len() - ".txt".len()];
        assert_eq!(digits.len(), 4);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn small_deletion_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("story.txt");
        let prev = "a".repeat(3000);

        let written = on_content_observed(&prev, "", Some(&doc)).expect("no error");
        assert_eq!(written, None);
        assert!(backups_in(dir.path()).is_empty());
    }

    #[test]
    fn no_document_means_no_backup() {
        let prev = "a".repeat(5000);
        assert_eq!(on_content_observed(&prev, "", None).expect("no error"), None);
    }

    #[test]
    fn unwritable_location_reports_backup_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("no_such_dir").join("story.txt");
        let prev = "a".repeat(5000);

        let err = on_content_observed(&prev, "", Some(&doc)).expect_err("must fail");
        assert!(matches!(err, QuillError::Backup { .. }));
    }
}
