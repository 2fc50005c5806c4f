//! Extraction of `<task>`, `<context>` and `<subtask>` blocks from planning
//! text.
//!
//! Blocks are found by a single line-oriented scan. A block is either
//! single-line (`<context>text</context>`) or multi-line (opener on one line,
//! content accumulated until a line containing the closer). `<context>` and
//! `<subtask>` blocks attach to the most recently completed `<task>` block;
//! blocks seen before any task are dropped. An unterminated block still
//! contributes its content but does not claim the lines it ran over.

use tracing::debug;

use super::classify::{checkbox, normalize_checkbox};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Task,
    Context,
    Subtask,
}

impl Tag {
    const ALL: [Self; 3] = [Self::Task, Self::Context, Self::Subtask];

    fn open(self) -> &'static str {
        match self {
            Self::Task => "<task>",
            Self::Context => "<context>",
            Self::Subtask => "<subtask>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Self::Task => "</task>",
            Self::Context => "</context>",
            Self::Subtask => "</subtask>",
        }
    }

    /// The tag whose opener `s` starts with, if any.
    fn opening(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| s.starts_with(tag.open()))
    }
}

/// Everything the tag scan found, in document order.
///
/// Association lists are keyed by [`title_key`] and keep insertion order so
/// lookups are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBlocks {
    /// Task-block titles in the order they were opened, repeats included.
    pub titles: Vec<String>,
    /// Context per task key. A later block for the same key overwrites.
    pub contexts: Vec<(String, String)>,
    /// Normalized subtask items per task key. Later blocks append.
    pub subtasks: Vec<(String, Vec<String>)>,
    /// Indices of physical lines covered by a closed block, ascending.
    consumed: Vec<usize>,
}

impl TagBlocks {
    /// Context for a task title: exact key match first, then the first key
    /// that is a prefix of the title or vice versa.
    pub fn context_for(&self, title: &str) -> Option<&str> {
        lookup(&self.contexts, title).map(String::as_str)
    }

    /// Subtask items for a task title, matched like [`Self::context_for`].
    pub fn subtasks_for(&self, title: &str) -> Option<&[String]> {
        lookup(&self.subtasks, title).map(Vec::as_slice)
    }

    /// Whether the physical line at `index` was part of a closed tag block.
    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.binary_search(&index).is_ok()
    }

    fn mark_consumed(&mut self, lines: std::ops::RangeInclusive<usize>) {
        for index in lines {
            if self.consumed.last().is_none_or(|&last| last < index) {
                self.consumed.push(index);
            }
        }
    }
}

/// Normalized association key for a title: trimmed and lower-cased.
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

fn lookup<'a, T>(entries: &'a [(String, T)], title: &str) -> Option<&'a T> {
    let key = title_key(title);
    if key.is_empty() {
        return None;
    }
    entries
        .iter()
        .find(|(k, _)| *k == key)
        .or_else(|| {
            entries
                .iter()
                .find(|(k, _)| key.starts_with(k.as_str()) || k.starts_with(key.as_str()))
        })
        .map(|(_, value)| value)
}

/// Scan `text` for tag blocks.
pub fn extract_tag_blocks(text: &str) -> TagBlocks {
    let mut scanner = Scanner::default();
    for (index, line) in text.lines().enumerate() {
        for segment in split_adjacent_blocks(line) {
            scanner.feed(index, segment);
        }
    }
    scanner.finish()
}

/// A multi-line block that has been opened but not yet closed.
#[derive(Debug)]
struct OpenBlock {
    tag: Tag,
    /// Physical line of the opener.
    start: usize,
    lines: Vec<String>,
}

#[derive(Debug, Default)]
struct Scanner {
    blocks: TagBlocks,
    /// Key of the task that context/subtask blocks currently attach to.
    current_task: Option<String>,
    open: Option<OpenBlock>,
}

impl Scanner {
    /// Feed one logical line found on physical line `index`.
    fn feed(&mut self, index: usize, segment: &str) {
        if let Some(mut block) = self.open.take() {
            match segment.find(block.tag.close()) {
                Some(pos) => {
                    block.lines.push(segment[..pos].to_string());
                    log_discarded_tail(block.tag, &segment[pos + block.tag.close().len()..]);
                    self.record(block.tag, &block.lines.join("\n"));
                    self.blocks.mark_consumed(block.start..=index);
                }
                None => {
                    block.lines.push(segment.to_string());
                    self.open = Some(block);
                }
            }
            return;
        }

        let trimmed = segment.trim();
        let Some(tag) = Tag::opening(trimmed) else {
            return;
        };
        let rest = &trimmed[tag.open().len()..];
        match rest.find(tag.close()) {
            Some(pos) => {
                log_discarded_tail(tag, &rest[pos + tag.close().len()..]);
                self.record(tag, &rest[..pos]);
                self.blocks.mark_consumed(index..=index);
            }
            None => {
                let mut lines = Vec::new();
                if !rest.trim().is_empty() {
                    lines.push(rest.to_string());
                }
                self.open = Some(OpenBlock {
                    tag,
                    start: index,
                    lines,
                });
            }
        }
    }

    fn record(&mut self, tag: Tag, content: &str) {
        let content = content.trim();
        match tag {
            Tag::Task => {
                if content.is_empty() {
                    debug!("ignoring empty <task> block");
                    self.current_task = None;
                    return;
                }
                self.blocks.titles.push(content.to_string());
                self.current_task = Some(title_key(content));
            }
            Tag::Context => {
                let Some(key) = self.current_task.as_deref() else {
                    debug!("dropping <context> block with no preceding <task>");
                    return;
                };
                match self.blocks.contexts.iter_mut().find(|(k, _)| k == key) {
                    Some((_, existing)) => *existing = content.to_string(),
                    None => self
                        .blocks
                        .contexts
                        .push((key.to_string(), content.to_string())),
                }
            }
            Tag::Subtask => {
                let Some(key) = self.current_task.as_deref() else {
                    debug!("dropping <subtask> block with no preceding <task>");
                    return;
                };
                let items = normalize_subtask_block(content);
                match self.blocks.subtasks.iter_mut().find(|(k, _)| k == key) {
                    Some((_, existing)) => existing.extend(items),
                    None => self.blocks.subtasks.push((key.to_string(), items)),
                }
            }
        }
    }

    /// Close any block still open. Its lines are left unconsumed so the
    /// checkbox scan still sees them.
    fn finish(mut self) -> TagBlocks {
        if let Some(block) = self.open.take() {
            debug!(tag = block.tag.open(), "closing unterminated block at end of input");
            self.record(block.tag, &block.lines.join("\n"));
        }
        self.blocks
    }
}

fn log_discarded_tail(tag: Tag, tail: &str) {
    let tail = tail.trim();
    if !tail.is_empty() {
        debug!(tag = tag.close(), tail, "discarding text after closing tag");
    }
}

/// Turn `<subtask>` content into canonical checkbox items.
///
/// Checkbox lines are normalized; any other non-empty line becomes an
/// unchecked item after dropping one leading `- `.
fn normalize_subtask_block(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            if let Some(item) = normalize_checkbox(line) {
                return Some(item);
            }
            let text = line.strip_prefix("- ").unwrap_or(line).trim();
            (!text.is_empty()).then(|| checkbox(false, text))
        })
        .collect()
}

/// Split a physical line wherever a closing tag is directly followed by
/// another opening tag, so `<task>a</task><context>b</context>` is scanned
/// as two single-line blocks.
fn split_adjacent_blocks(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = line;
    while let Some(cut) = next_block_boundary(rest) {
        segments.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    segments.push(rest);
    segments
}

fn next_block_boundary(s: &str) -> Option<usize> {
    Tag::ALL
        .iter()
        .flat_map(|tag| {
            s.match_indices(tag.close())
                .map(|(pos, closer)| pos + closer.len())
        })
        .filter(|&end| Tag::opening(s[end..].trim_start()).is_some())
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_blocks() {
        let blocks = extract_tag_blocks(
            "<task>Setup CI</task>\n<context>pipeline info</context>\n<subtask>- [ ] step1</subtask>",
        );
        assert_eq!(blocks.titles, vec!["Setup CI"]);
        assert_eq!(blocks.context_for("Setup CI"), Some("pipeline info"));
        assert_eq!(
            blocks.subtasks_for("setup ci"),
            Some(&["- [ ] step1".to_string()][..])
        );
    }

    #[test]
    fn adjacent_blocks_on_one_line() {
        let blocks = extract_tag_blocks(
            "<task>Setup CI</task><context>pipeline info</context><subtask>- [ ] step1</subtask>",
        );
        assert_eq!(blocks.titles, vec!["Setup CI"]);
        assert_eq!(blocks.context_for("Setup CI"), Some("pipeline info"));
        assert_eq!(blocks.subtasks_for("Setup CI").map(<[String]>::len), Some(1));
    }

    #[test]
    fn multi_line_blocks_accumulate_until_closer() {
        let text = "\
<task>
  Build API
</task>
<context>
Line one
Line two
tail</context>
<subtask>
- [X] design endpoints
write handlers
- add auth
</subtask>";
        let blocks = extract_tag_blocks(text);
        assert_eq!(blocks.titles, vec!["Build API"]);
        assert_eq!(
            blocks.context_for("Build API"),
            Some("Line one\nLine two\ntail")
        );
        assert_eq!(
            blocks.subtasks_for("Build API").unwrap(),
            &[
                "- [x] design endpoints".to_string(),
                "- [ ] write handlers".to_string(),
                "- [ ] add auth".to_string(),
            ]
        );
    }

    #[test]
    fn opener_line_text_starts_the_content() {
        let blocks = extract_tag_blocks("<task>A</task>\n<context>first part\nsecond part</context>");
        assert_eq!(blocks.context_for("A"), Some("first part\nsecond part"));
    }

    #[test]
    fn blocks_attach_to_the_most_recent_task() {
        let text = "\
<task>First</task>
<context>ctx one</context>
<task>Second</task>
<context>ctx two</context>
<subtask>only second</subtask>";
        let blocks = extract_tag_blocks(text);
        assert_eq!(blocks.titles, vec!["First", "Second"]);
        assert_eq!(blocks.context_for("First"), Some("ctx one"));
        assert_eq!(blocks.context_for("Second"), Some("ctx two"));
        assert_eq!(blocks.subtasks_for("First"), None);
    }

    #[test]
    fn later_context_overwrites_earlier() {
        let blocks =
            extract_tag_blocks("<task>A</task>\n<context>old</context>\n<context>new</context>");
        assert_eq!(blocks.contexts, vec![("a".to_string(), "new".to_string())]);
    }

    #[test]
    fn subtask_blocks_for_same_task_append() {
        let blocks = extract_tag_blocks(
            "<task>A</task>\n<subtask>one</subtask>\n<task>a</task>\n<subtask>two</subtask>",
        );
        assert_eq!(blocks.titles, vec!["A", "a"]);
        assert_eq!(
            blocks.subtasks_for("A").unwrap(),
            &["- [ ] one".to_string(), "- [ ] two".to_string()]
        );
    }

    #[test]
    fn blocks_before_any_task_are_dropped() {
        let blocks = extract_tag_blocks("<context>orphan</context>\n<subtask>x</subtask>");
        assert!(blocks.titles.is_empty());
        assert!(blocks.contexts.is_empty());
        assert!(blocks.subtasks.is_empty());
    }

    #[test]
    fn unterminated_block_is_closed_at_end_of_input() {
        let blocks = extract_tag_blocks("<task>A</task>\n<context>\nnever closed\nstill going");
        assert_eq!(blocks.context_for("A"), Some("never closed\nstill going"));
    }

    #[test]
    fn empty_task_block_detaches_following_blocks() {
        let blocks = extract_tag_blocks("<task>A</task>\n<task></task>\n<context>lost</context>");
        assert_eq!(blocks.titles, vec!["A"]);
        assert_eq!(blocks.context_for("A"), None);
    }

    #[test]
    fn lookup_falls_back_to_prefix_in_either_direction() {
        let blocks = extract_tag_blocks(
            "<task>Setup</task>\n<context>short key</context>\n<task>Implement the parser module</task>\n<context>long key</context>",
        );
        // Key is a prefix of the title.
        assert_eq!(blocks.context_for("Setup CI pipeline"), Some("short key"));
        // Title is a prefix of the key.
        assert_eq!(blocks.context_for("Implement the parser"), Some("long key"));
        assert_eq!(blocks.context_for("Unrelated"), None);
    }

    #[test]
    fn exact_match_wins_over_earlier_prefix_match() {
        let blocks = extract_tag_blocks(
            "<task>Build</task>\n<context>prefix</context>\n<task>Build API</task>\n<context>exact</context>",
        );
        assert_eq!(blocks.context_for("build api"), Some("exact"));
    }

    #[test]
    fn consumed_lines_cover_block_interiors() {
        let text = "- [ ] Outside\n<subtask>\n- [ ] Inside\n</subtask>\nafter";
        let blocks = extract_tag_blocks(text);
        assert!(!blocks.is_consumed(0));
        assert!(blocks.is_consumed(1));
        assert!(blocks.is_consumed(2));
        assert!(blocks.is_consumed(3));
        assert!(!blocks.is_consumed(4));
    }

    #[test]
    fn unterminated_block_leaves_lines_unconsumed() {
        let text = "<task>A</task>\n<context>\nnotes\n- [ ] Build API";
        let blocks = extract_tag_blocks(text);
        assert!(blocks.is_consumed(0));
        assert!(!blocks.is_consumed(1));
        assert!(!blocks.is_consumed(2));
        assert!(!blocks.is_consumed(3));
        assert_eq!(blocks.context_for("A"), Some("notes\n- [ ] Build API"));
    }

    #[test]
    fn repeated_task_blocks_keep_every_title() {
        let blocks = extract_tag_blocks("<task>Deploy</task>\n<task>Deploy</task>");
        assert_eq!(blocks.titles, vec!["Deploy", "Deploy"]);
    }

    #[test]
    fn titles_keep_internal_whitespace() {
        let blocks = extract_tag_blocks("<task>  Setup  CI </task>\n<context>pipeline info</context>");
        assert_eq!(blocks.titles, vec!["Setup  CI"]);
        assert_eq!(blocks.context_for("Setup  CI"), Some("pipeline info"));
        assert_eq!(blocks.context_for("Setup CI"), None);
    }

    #[test]
    fn text_after_closer_is_discarded() {
        let blocks = extract_tag_blocks("<task>A</task> trailing words\n<context>ctx</context> more");
        assert_eq!(blocks.titles, vec!["A"]);
        assert_eq!(blocks.context_for("A"), Some("ctx"));
        assert!(blocks.is_consumed(0));
        assert!(blocks.is_consumed(1));
    }

    #[test]
    fn split_only_between_closer_and_opener() {
        assert_eq!(
            split_adjacent_blocks("<task>a</task> <context>b</context>"),
            vec!["<task>a</task>", " <context>b</context>"]
        );
        assert_eq!(
            split_adjacent_blocks("text with </task> but no opener"),
            vec!["text with </task> but no opener"]
        );
    }
}
