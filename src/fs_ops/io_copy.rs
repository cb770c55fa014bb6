//! Streaming byte copy into a fresh file.
//!
//! The destination is created with `create_new`, so an existing file is never
//! clobbered here; callers copy into a temporary name and rename it into
//! place. The source is read once start to EOF; bytes appended concurrently
//! are not included.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

/// Copy `src` -> `dst` (must not exist) and fsync `dst`. Returns bytes copied.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(bytes)
}
