//! Compressed input and plain output handles for the pipeline's flat files.
//!
//! Proteomes, symbol tables and mutation tables are frequently shipped
//! gzip- or zstd-compressed. Everything that reads them goes through
//! [`open_input`], so compression is detected once, here.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Opens a file with automatic compression detection.
///
/// `niffler` sniffs the magic bytes and transparently decodes gzip, bzip2,
/// xz and zstd; anything else is read as-is.
///
/// # Examples
/// ```no_run
/// use neopairs::io::open_maybe_compressed;
/// use std::io::BufRead;
///
/// let reader = open_maybe_compressed("Homo_sapiens.GRCh38.pep.all.fa.gz")?;
/// for line in reader.lines() {
///     let _line = line?;
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open_maybe_compressed<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    // niffler autodetects gzip/bzip2/xz/zstd/uncompressed
    let (reader, _format) = niffler::get_reader(Box::new(file))
        .with_context(|| format!("Failed to detect compression of {}", path.display()))?;
    Ok(Box::new(BufReader::new(reader)))
}

/// Creates a buffered reader from stdin for pipeline processing.
pub fn stdin_reader() -> Box<dyn BufRead> {
    Box::new(BufReader::new(io::stdin()))
}

/// Opens a path for reading, treating "-" as stdin.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path_str = path.as_ref().to_string_lossy();
    if path_str == "-" {
        Ok(stdin_reader())
    } else {
        open_maybe_compressed(path)
    }
}

/// Opens the output sink: a buffered file when a path is given, stdout otherwise.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if path.to_string_lossy() != "-" => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
