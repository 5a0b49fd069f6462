//! Locating helper programs on the host.

use std::path::{Path, PathBuf};

/// Resolve a program name to an executable path.
///
/// A value containing a path separator is taken literally and only checked
/// for existence; a bare name is searched on `PATH`.
pub fn find_program(name: &str) -> Option<PathBuf> {
    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        let p = PathBuf::from(name);
        return is_executable(&p).then_some(p);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

/// First of `names` present on the host, returned with its resolved path.
pub fn find_first<'a>(names: &[&'a str]) -> Option<(&'a str, PathBuf)> {
    names
        .iter()
        .find_map(|name| find_program(name).map(|path| (*name, path)))
}

/// File name of a program path without extension, e.g. `espeak-ng` for
/// `/usr/bin/espeak-ng`.
pub fn program_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut out = vec![dir.join(name)];
    if cfg!(windows) {
        out.push(dir.join(format!("{}.exe", name)));
    }
    out
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
