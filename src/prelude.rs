//! Common imports shared across the socket-facing modules (`listener`,
//! `pipeline`, `static_file`, `cgi`, `server`): the error taxonomy plus the
//! networking/process types those modules all touch. Pulled in with
//! `use crate::prelude::*;`, matching the teacher's `prelude.rs` convention.

pub use crate::error::{Result, ServerError};
pub use std::io::{Read, Write};
pub use std::net::{SocketAddr, TcpListener, TcpStream};
pub use std::process::{Command, Stdio};
