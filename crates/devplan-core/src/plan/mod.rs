//! Planning text: classification, tag extraction, parsing, ordering and
//! rendering.

pub mod classify;
pub mod order;
pub mod parser;
pub mod render;
pub mod scaffold;
pub mod tags;
pub mod task;

pub use classify::{LineKind, checkbox, classify_line, normalize_checkbox};
pub use order::{assign_task_ids, ensure_scaffold_first, task_id};
pub use parser::parse_tasks;
pub use render::{RenderOptions, render_task_file, render_task_list, xml_escape};
pub use scaffold::SCAFFOLD_PLAN;
pub use tags::{TagBlocks, extract_tag_blocks, title_key};
pub use task::{DevTask, SCAFFOLD_TITLE};
