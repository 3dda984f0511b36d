use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors a concatenation job can fail with.
///
/// There are exactly two kinds: the job could not read one of its declared
/// sources, or it could not produce its destination.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("source file not found or unreadable: {path}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("destination not writable: {path}")]
    DestinationUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Concatenate `sources` into `destination`, in list order.
///
/// The destination is truncated if it already exists. Each source is
/// streamed line-by-line and appended verbatim: line terminators are
/// preserved as-is (LF, CRLF, or a missing final newline), nothing is
/// inserted between files, and no encoding conversion takes place. The
/// destination content is therefore byte-for-byte the ordered
/// concatenation of the sources' content.
///
/// On failure the partially written destination is deleted before the
/// error is returned, so a failing job never leaves a truncated bundle
/// behind that looks like a successful one.
pub fn concatenate(destination: &Path, sources: &[PathBuf]) -> Result<(), ConcatError> {
    let dest_file = File::create(destination).map_err(|err| ConcatError::DestinationUnwritable {
        path: destination.to_path_buf(),
        source: err,
    })?;
    let mut writer = BufWriter::new(dest_file);

    for source in sources {
        if let Err(err) = append_source(&mut writer, destination, source) {
            discard_partial_output(writer, destination);
            return Err(err);
        }
    }

    // BufWriter::drop swallows errors, so flush explicitly before closing.
    if let Err(err) = writer.flush() {
        let _ = fs::remove_file(destination);
        return Err(ConcatError::DestinationUnwritable {
            path: destination.to_path_buf(),
            source: err,
        });
    }

    Ok(())
}

/// Stream one source file into the destination writer, preserving its bytes
/// exactly. The source handle is dropped as soon as it is fully consumed.
fn append_source(
    writer: &mut BufWriter<File>,
    destination: &Path,
    source: &Path,
) -> Result<(), ConcatError> {
    let file = File::open(source).map_err(|err| ConcatError::SourceNotFound {
        path: source.to_path_buf(),
        source: err,
    })?;
    let mut reader = BufReader::new(file);

    // read_until keeps the terminator in the buffer, so CRLF endings and a
    // missing final newline pass through untouched.
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|err| ConcatError::SourceNotFound {
                path: source.to_path_buf(),
                source: err,
            })?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&line)
            .map_err(|err| ConcatError::DestinationUnwritable {
                path: destination.to_path_buf(),
                source: err,
            })?;
    }

    Ok(())
}

fn discard_partial_output(writer: BufWriter<File>, destination: &Path) {
    drop(writer);
    if let Err(err) = fs::remove_file(destination) {
        log::warn!(
            "Failed to remove partial output {}: {}",
            destination.display(),
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn concatenates_in_list_order() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let a = dir.path().join("a.css");
        let b = dir.path().join("b.css");
        fs::write(&a, "body{color:red}\n")?;
        fs::write(&b, ".cls{}\n")?;

        let out = dir.path().join("out.css");
        concatenate(&out, &[a, b])?;

        assert_eq!(fs::read_to_string(&out)?, "body{color:red}\n.cls{}\n");
        Ok(())
    }

    #[test]
    fn missing_trailing_newline_abuts_next_source() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        fs::write(&a, "var a=1;")?;
        fs::write(&b, "var b=2;\n")?;

        let out = dir.path().join("out.js");
        concatenate(&out, &[a, b])?;

        assert_eq!(fs::read_to_string(&out)?, "var a=1;var b=2;\n");
        Ok(())
    }

    #[test]
    fn missing_source_removes_partial_output() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let a = dir.path().join("a.css");
        fs::write(&a, "present\n")?;
        let missing = dir.path().join("missing.css");

        let out = dir.path().join("out.css");
        let err = concatenate(&out, &[a, missing.clone()]).unwrap_err();

        assert!(matches!(err, ConcatError::SourceNotFound { path, .. } if path == missing));
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn missing_destination_directory_is_unwritable() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let a = dir.path().join("a.css");
        fs::write(&a, "x\n")?;

        let out = dir.path().join("no-such-dir").join("out.css");
        let err = concatenate(&out, &[a]).unwrap_err();

        assert!(matches!(err, ConcatError::DestinationUnwritable { path, .. } if path == out));
        Ok(())
    }
}
