use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{info, warn};

/// Compressed-input formats, recognised by file extension and handed to the
/// matching system tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Bzip2,
    Gzip,
}

impl Codec {
    pub fn detect(path: &Path) -> Option<Codec> {
        match path.extension()?.to_str()? {
            "bz2" => Some(Codec::Bzip2),
            "gz" => Some(Codec::Gzip),
            _ => None,
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Codec::Bzip2 => "bunzip2",
            Codec::Gzip => "gunzip",
        }
    }

    /// Where the tool writes its output: the source path minus its suffix.
    pub fn artifact_path(self, source: &Path) -> PathBuf {
        source.with_extension("")
    }
}

/// A decompressed file that is deleted when the guard goes out of scope.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(action = "remove", component = "temp_artifact", path = ?self.path, "Removed decompressed file")
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(action = "remove", component = "temp_artifact", path = ?self.path, error = %e, "Failed to remove temporary file")
            }
        }
    }
}

/// Runs the external tool once, keeping the compressed original.
///
/// Returns a guard for the decompressed sibling file, or `None` when the
/// tool left no output behind. A file already sitting at the sibling path
/// belongs to the user: it is never scanned or removed here, and the source
/// yields `None` without running the tool.
pub fn decompress(source: &Path, codec: Codec) -> Option<TempArtifact> {
    let start_time = Instant::now();
    let artifact = codec.artifact_path(source);

    if artifact.exists() {
        warn!(action = "skip", component = "decompress", source = ?source, artifact = ?artifact, "Decompression target already exists");
        return None;
    }

    info!(action = "start", component = "decompress", program = codec.program(), source = ?source, artifact = ?artifact, "Decompressing source");

    let output = Command::new(codec.program())
        .arg("-k")
        .arg(source)
        .stdin(Stdio::null())
        .output();

    let succeeded = match output {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                action = "run",
                component = "decompress",
                program = codec.program(),
                status = %output.status,
                stderr = %stderr.trim(),
                "Decompression tool reported failure"
            );
            false
        }
        Err(e) => {
            warn!(action = "spawn", component = "decompress", program = codec.program(), error = %e, "Could not run decompression tool");
            false
        }
    };

    if !succeeded && !artifact.exists() {
        return None;
    }

    info!(
        action = "complete",
        component = "decompress",
        succeeded,
        duration_ms = start_time.elapsed().as_millis(),
        "Decompressed file ready"
    );
    Some(TempArtifact::new(artifact))
}
