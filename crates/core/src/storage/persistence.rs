//! Disk persistence for the trip store.
//!
//! All documents are written to a single JSON snapshot, `trips.snapshot`, with a CRC32
//! footer: `[json payload][magic "TRS1"][u32 CRC32 BE]`. Writes go to a temp file that is
//! renamed into place, so a crash mid-write leaves the previous snapshot intact.

use crate::config;
use crate::document::RawTrip;
use crate::storage::store::Database;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Magic bytes before the CRC32 footer.
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"TRS1";

/// Path of the snapshot file inside `dir`.
pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(config::SNAPSHOT_FILE)
}

/// Writes every stored document to `<dir>/trips.snapshot`.
///
/// Concurrent saves of the same store run one at a time; each one writes the documents
/// present when it takes its turn.
pub fn save_snapshot(db: &Database, dir: &Path) -> io::Result<()> {
    let _guard = db.lock_snapshot();
    let documents = db.all_trips();
    let bytes = serde_json::to_vec(&documents).map_err(|e| io::Error::other(e.to_string()))?;
    let crc = crc32fast::hash(&bytes);

    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
    }
    let path = snapshot_path(dir);
    let tmp_path = dir.join(format!("{}.tmp", config::SNAPSHOT_FILE));

    let mut output = Vec::with_capacity(bytes.len() + 8);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    fs::write(&tmp_path, &output)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp_path, &path)?;

    tracing::info!(
        "Saved {} trips to {:?} ({} bytes, CRC32={:#010x})",
        documents.len(),
        path,
        bytes.len(),
        crc
    );
    Ok(())
}

/// Loads the snapshot from `dir`. A missing snapshot yields an empty store.
pub fn load_snapshot(dir: &Path) -> io::Result<Database> {
    let path = snapshot_path(dir);
    if !path.exists() {
        tracing::info!("No snapshot at {:?}, starting empty", path);
        return Ok(Database::new());
    }
    let raw = fs::read(&path)?;
    let payload = verify_footer(&raw, &path)?;

    let documents: Vec<RawTrip> = serde_json::from_slice(payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let db = Database::from_documents(documents);

    tracing::info!("Loaded {} trips from {:?}", db.document_count(), path);
    Ok(db)
}

fn verify_footer<'a>(raw: &'a [u8], path: &Path) -> io::Result<&'a [u8]> {
    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Snapshot {:?} has no CRC32 footer", path),
        ));
    }
    let payload = &raw[..raw.len() - 8];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Snapshot CRC32 mismatch: expected {:#010x}, got {:#010x}. File may be corrupted: {:?}",
                stored_crc, computed_crc, path
            ),
        ));
    }
    tracing::debug!("Snapshot CRC32 verified: {:#010x}", stored_crc);
    Ok(payload)
}
