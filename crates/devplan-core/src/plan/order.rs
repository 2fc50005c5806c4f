//! Final ordering rules: scaffold task first, then sequential IDs.

use super::task::DevTask;

/// Guarantee a scaffold task at position 0.
///
/// - Empty input yields a single synthetic scaffold task.
/// - A list already headed by a scaffold task is returned unchanged.
/// - Otherwise the first scaffold task is moved to the front, keeping the
///   relative order of everything else, or a synthetic one is prepended.
pub fn ensure_scaffold_first(mut tasks: Vec<DevTask>) -> Vec<DevTask> {
    match tasks.iter().position(DevTask::is_scaffold) {
        Some(0) => tasks,
        Some(index) => {
            let scaffold = tasks.remove(index);
            tasks.insert(0, scaffold);
            tasks
        }
        None => {
            tasks.insert(0, DevTask::scaffold());
            tasks
        }
    }
}

/// Overwrite every task's ID with `TASK-NNN` based on its position.
pub fn assign_task_ids(tasks: &mut [DevTask]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.id = task_id(index + 1);
    }
}

/// Format a 1-based sequence number as a task ID.
pub fn task_id(sequence: usize) -> String {
    format!("TASK-{sequence:03}")
}
