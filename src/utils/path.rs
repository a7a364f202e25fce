/// Derive the folder identifier from a completion payload's `project_path`.
///
/// The backend reports a server-side path like `/out/todo-app-1/` (either
/// separator, optional trailing separator); the last segment is the folder
/// the preview and file endpoints address.
pub fn folder_from_project_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_end_matches(['/', '\\']);
    let folder = trimmed.rsplit(['/', '\\']).next().unwrap_or_default();
    if folder.is_empty() {
        None
    } else {
        Some(folder.to_string())
    }
}
