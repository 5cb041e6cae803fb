//! Static file serving via memory-mapped I/O (spec §4.6 step 5).
//!
//! Grounded on the teacher's `handlers/get_handler.rs` (open, stat, mime
//! lookup, error mapping), replacing its non-blocking `ActiveAction` return
//! value with a direct blocking write — there is no event loop to resume
//! later in this design.

use std::fs::File;
use std::os::unix::fs::PermissionsExt;

use memmap2::Mmap;

use crate::http::response::{mime_type, HttpResponse};
use crate::prelude::*;

/// Requires a regular file readable by the owning user (spec §4.6 step 5);
/// maps it for its exact size and writes header + body to `stream` in two
/// writes, then unmaps before returning (spec §5: mappings are scoped to
/// the write that consumes them).
pub fn serve(stream: &mut TcpStream, path: &str) -> Result<()> {
    let file = File::open(path).map_err(|e| classify_open_error(e, path))?;
    let metadata = file.metadata()?;

    if !metadata.is_file() {
        return Err(ServerError::Forbidden(path.to_string()));
    }
    if metadata.permissions().mode() & 0o400 == 0 {
        return Err(ServerError::Forbidden(path.to_string()));
    }

    let size = metadata.len() as usize;

    let mut res = HttpResponse::new(200, "OK");
    // An empty file has nothing to mmap (`Mmap::map` rejects zero-length
    // mappings); a zero-length body still gets a correct Content-Length.
    if size == 0 {
        res.set_body(Vec::new(), mime_type(path));
        stream.write_all(&res.to_bytes())?;
        return Ok(());
    }

    res.set_body(Vec::new(), mime_type(path));
    res.set_header("Content-Length", &size.to_string());
    stream.write_all(&res.headers_to_bytes())?;

    // SAFETY: the file is opened read-only for the duration of this call and
    // not concurrently truncated by this process; the mapping is dropped
    // (unmapped) immediately after the write completes.
    let mmap = unsafe { Mmap::map(&file)? };
    stream.write_all(&mmap)?;
    drop(mmap);

    Ok(())
}

fn classify_open_error(e: std::io::Error, path: &str) -> ServerError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ServerError::NotFound(path.to_string()),
        std::io::ErrorKind::PermissionDenied => ServerError::Forbidden(path.to_string()),
        _ => ServerError::Io(e),
    }
}
