use std::path::Path;

/// Replaces a leading home directory with `~` for display.
pub fn prettify_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => prettify_with_home(path, &home),
        None => path.display().to_string(),
    }
}

fn prettify_with_home(path: &Path, home: &Path) -> String {
    if home.as_os_str().is_empty() {
        return path.display().to_string();
    }

    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        Err(_) => path.display().to_string(),
    }
}
