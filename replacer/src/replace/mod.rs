//! The dual-strategy file rewriters.
//!
//! Small files are read whole, transformed in memory, and rewritten. Large
//! files are streamed line-by-line into a temporary file. Both strategies
//! write through a [`NamedTempFile`] in the target's own directory and
//! finish with an atomic rename, so a half-written file is never observable
//! and a failed or cancelled rewrite leaves the original untouched.
//!
//! Matching is literal byte-for-byte substring substitution, left-to-right
//! and non-overlapping. No pattern syntax, no encoding assumptions: files
//! that are not valid UTF-8 are rewritten the same as any other.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::trace;

use crate::cancel::CancelToken;
use crate::errors::{ReplaceError, ReplaceResult};

/// Buffer capacity for streamed rewrites.
const BUFFER_CAPACITY: usize = 65536;

/// Replaces every non-overlapping occurrence of `search` in `content`,
/// scanning left to right. An empty `search` matches nothing and returns the
/// content unchanged.
pub fn replace_all(content: &[u8], search: &[u8], replace: &[u8]) -> Vec<u8> {
    if search.is_empty() {
        return content.to_vec();
    }

    let mut output = Vec::with_capacity(content.len());
    let mut rest = content;
    while rest.len() >= search.len() {
        match find(rest, search) {
            Some(pos) => {
                output.extend_from_slice(&rest[..pos]);
                output.extend_from_slice(replace);
                rest = &rest[pos + search.len()..];
            }
            None => break,
        }
    }
    output.extend_from_slice(rest);
    output
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Rewrites a small file in one pass: read everything, substitute, write the
/// result to a temp file next to the original and rename it into place.
pub fn replace_in_file(path: &Path, search: &str, replace: &str) -> ReplaceResult<()> {
    trace!("In-memory rewrite of {}", path.display());

    let content = fs::read(path).map_err(|e| ReplaceError::from_io(path, e))?;
    let output = replace_all(&content, search.as_bytes(), replace.as_bytes());

    let mut temp = scratch_file(path)?;
    temp.write_all(&output)?;
    persist(temp, path)
}

/// Rewrites a large file by streaming it line-by-line into a temp file.
///
/// A line is any byte run delimited by `\n`; the delimiter is stripped on
/// read and re-appended on write, so a file lacking a trailing newline gains
/// one. The token is polled before each line: on cancellation the temp file
/// is discarded and the original is left byte-for-byte unchanged.
pub fn replace_in_large_file(
    path: &Path,
    search: &str,
    replace: &str,
    token: &CancelToken,
) -> ReplaceResult<()> {
    trace!("Streamed rewrite of {}", path.display());

    let input = File::open(path).map_err(|e| ReplaceError::from_io(path, e))?;
    let temp = scratch_file(path)?;

    let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, input);
    let mut writer = BufWriter::with_capacity(BUFFER_CAPACITY, temp.as_file());

    let mut line = Vec::new();
    loop {
        token.check()?;

        line.clear();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }

        let replaced = replace_all(&line, search.as_bytes(), replace.as_bytes());
        writer.write_all(&replaced)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    drop(writer);
    persist(temp, path)
}

/// Creates the scratch temp file in the target's parent directory, keeping
/// the final rename on a single filesystem.
fn scratch_file(path: &Path) -> ReplaceResult<NamedTempFile> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let temp = NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))?;
    Ok(temp)
}

/// Atomically renames the temp file over the original. The rename is the
/// last step of every rewrite and has no cancellation check.
fn persist(temp: NamedTempFile, path: &Path) -> ReplaceResult<()> {
    temp.persist(path)
        .map_err(|e| ReplaceError::IoError(e.error))?;
    Ok(())
}
