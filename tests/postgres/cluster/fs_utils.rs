//! Filesystem helpers for `PostgreSQL` test clusters.

use super::BoxError;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;
use std::io::ErrorKind;
use std::path::Path;

fn open_dir(path: &Path) -> Result<Dir, BoxError> {
    let lossy = path.to_string_lossy();
    Dir::open_ambient_dir(Utf8Path::new(lossy.as_ref()), ambient_authority())
        .map_err(|err| Box::new(err) as BoxError)
}

/// Reads `file_name` under `dir`, treating a missing file as `None`.
fn read_optional(dir: &Path, file_name: &str) -> Result<Option<String>, BoxError> {
    match open_dir(dir)?.read_to_string(file_name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Box::new(err)),
    }
}

pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_path = settings.password_file.clone();
    let Some(file_name) = password_path.file_name().and_then(|name| name.to_str()) else {
        return Err(Box::new(std::io::Error::other(
            "password file path must end in a UTF-8 file name",
        )));
    };
    let parent = password_path.parent().unwrap_or_else(|| Path::new("."));
    if let Some(contents) = read_optional(parent, file_name)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// Picks up the port the postmaster actually bound from `postmaster.pid`.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let Some(contents) = read_optional(&settings.data_dir, "postmaster.pid")? else {
        return Ok(());
    };
    let port = contents
        .lines()
        .nth(3)
        .map(str::trim)
        .and_then(|line| line.parse::<u16>().ok());
    if let Some(bound) = port {
        settings.port = bound;
    }
    Ok(())
}
