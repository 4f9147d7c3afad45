//! Multi-select prompt for choosing files to stage.

use dialoguer::MultiSelect;

use crate::error::CommitError;
use crate::git::ChangedFile;

/// Ask the user which files to stage. Esc or an empty selection stages nothing.
pub fn select_files(files: &[ChangedFile]) -> Result<Vec<String>, CommitError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let labels: Vec<String> = files.iter().map(file_label).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Select files to stage (space to toggle, enter to confirm)")
        .items(&labels)
        .interact_opt()
        .map_err(|e| CommitError::PromptFailed(e.to_string()))?;

    Ok(chosen_paths(files, &chosen.unwrap_or_default()))
}

/// `M  src/lib.rs` style label, one status letter per row.
pub fn file_label(file: &ChangedFile) -> String {
    match &file.old_path {
        Some(old) => format!("{}  {} -> {}", file.status.letter(), old, file.path),
        None => format!("{}  {}", file.status.letter(), file.path),
    }
}

fn chosen_paths(files: &[ChangedFile], indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&i| files.get(i))
        .map(|f| f.path.clone())
        .collect()
}
