#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub use fedorable_test_utils::{builders, fake_backend, init_tracing, recording, with_timeout};

/// Write an executable shell script into `dir`.
///
/// Tests run scripts through `sh` as the "elevation" program, so the file is
/// read rather than exec'd directly (no ETXTBSY races between test threads).
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    set_mode(&path, 0o755);
    path
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(not(unix))]
pub fn set_mode(_path: &Path, _mode: u32) {}
