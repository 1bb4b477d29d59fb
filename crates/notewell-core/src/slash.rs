use crate::blocks::BlockType;
use crate::surface::MenuAnchor;

/// A live trigger match: the byte index of the `/` and the filter text typed
/// between it and the caret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashQuery {
    pub slash_index: usize,
    pub query: String,
}

/// Finds the trigger preceding the caret. The filter may not contain
/// whitespace; once it does the menu is no longer relevant.
pub fn find_slash_query(text: &str, cursor: usize) -> Option<SlashQuery> {
    if text.is_empty() {
        return None;
    }
    let mut cursor = cursor.min(text.len());
    while cursor > 0 && !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    if cursor == 0 {
        return None;
    }

    let before = &text[..cursor];
    let slash_index = before.rfind('/')?;
    let query = &text[slash_index + 1..cursor];
    if query.chars().any(|ch| ch.is_whitespace()) {
        return None;
    }

    Some(SlashQuery {
        slash_index,
        query: query.to_string(),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockCommandDef {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: BlockType,
}

/// Declared order is presentation order.
pub const BLOCK_COMMANDS: &[BlockCommandDef] = &[
    BlockCommandDef {
        id: "text",
        label: "Text",
        kind: BlockType::Paragraph,
    },
    BlockCommandDef {
        id: "h1",
        label: "Heading 1",
        kind: BlockType::Heading1,
    },
    BlockCommandDef {
        id: "h2",
        label: "Heading 2",
        kind: BlockType::Heading2,
    },
    BlockCommandDef {
        id: "h3",
        label: "Heading 3",
        kind: BlockType::Heading3,
    },
    BlockCommandDef {
        id: "bullet",
        label: "Bulleted list",
        kind: BlockType::BulletList,
    },
    BlockCommandDef {
        id: "number",
        label: "Numbered list",
        kind: BlockType::NumberedList,
    },
    BlockCommandDef {
        id: "todo",
        label: "To-do",
        kind: BlockType::Todo,
    },
    BlockCommandDef {
        id: "toggle",
        label: "Toggle list",
        kind: BlockType::Toggle,
    },
    BlockCommandDef {
        id: "code",
        label: "Code block",
        kind: BlockType::Code,
    },
    BlockCommandDef {
        id: "quote",
        label: "Quote",
        kind: BlockType::Quote,
    },
    BlockCommandDef {
        id: "callout",
        label: "Callout",
        kind: BlockType::Callout,
    },
    BlockCommandDef {
        id: "divider",
        label: "Divider",
        kind: BlockType::Divider,
    },
    BlockCommandDef {
        id: "image",
        label: "Image",
        kind: BlockType::Image,
    },
    BlockCommandDef {
        id: "file",
        label: "File attachment",
        kind: BlockType::File,
    },
    BlockCommandDef {
        id: "table",
        label: "Table",
        kind: BlockType::Table,
    },
];

/// Case-insensitive substring match over id and label, declared order.
pub fn filter_block_commands<'a>(
    query: &str,
    commands: &'a [BlockCommandDef],
) -> Vec<&'a BlockCommandDef> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return commands.iter().collect();
    }
    commands
        .iter()
        .filter(|cmd| {
            cmd.id.to_lowercase().contains(&query) || cmd.label.to_lowercase().contains(&query)
        })
        .collect()
}

pub fn cycle_index(current: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1) % len
    } else {
        current.checked_sub(1).unwrap_or(len.saturating_sub(1))
    }
}

/// Transient menu state; never persisted. `open == false` is the `Idle`
/// state, everything else only means something while open.
#[derive(Clone, Debug, PartialEq)]
pub struct SlashMenuState {
    pub open: bool,
    pub block_id: Option<String>,
    pub slash_index: Option<usize>,
    pub query: String,
    pub selected_index: usize,
    pub anchor: Option<MenuAnchor>,
}

impl SlashMenuState {
    pub fn closed() -> Self {
        Self {
            open: false,
            block_id: None,
            slash_index: None,
            query: String::new(),
            selected_index: 0,
            anchor: None,
        }
    }

    pub fn is_open_for(&self, block_id: &str) -> bool {
        self.open && self.block_id.as_deref() == Some(block_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_trigger_at_start_of_text() {
        let found = find_slash_query("/he", 3).expect("query");
        assert_eq!(found.slash_index, 0);
        assert_eq!(found.query, "he");
    }

    #[test]
    fn finds_trigger_after_whitespace() {
        let found = find_slash_query("hello /tod", 10).expect("query");
        assert_eq!(found.slash_index, 6);
        assert_eq!(found.query, "tod");
    }

    #[test]
    fn finds_trigger_inside_a_word() {
        let found = find_slash_query("hello/head", 10).expect("query");
        assert_eq!(found.slash_index, 5);
        assert_eq!(found.query, "head");
    }

    #[test]
    fn rejects_query_containing_whitespace() {
        assert_eq!(find_slash_query("/to do", 6), None);
    }

    #[test]
    fn no_trigger_without_slash_before_caret() {
        assert_eq!(find_slash_query("hello", 5), None);
        assert_eq!(find_slash_query("", 0), None);
        assert_eq!(find_slash_query("/x", 0), None);
    }

    #[test]
    fn filter_empty_query_returns_all_in_declared_order() {
        let all = filter_block_commands("", BLOCK_COMMANDS);
        assert_eq!(all.len(), BLOCK_COMMANDS.len());
        assert_eq!(all[0].id, "text");
        assert_eq!(all[1].id, "h1");
    }

    #[test]
    fn filter_matches_substring_case_insensitively() {
        let matched = filter_block_commands("HEAD", BLOCK_COMMANDS);
        let ids: Vec<&str> = matched.iter().map(|cmd| cmd.id).collect();
        assert_eq!(ids, vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn filter_matches_id_or_label() {
        let matched = filter_block_commands("h2", BLOCK_COMMANDS);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].kind, BlockType::Heading2);

        let matched = filter_block_commands("list", BLOCK_COMMANDS);
        let ids: Vec<&str> = matched.iter().map(|cmd| cmd.id).collect();
        assert_eq!(ids, vec!["bullet", "number", "toggle"]);
    }

    #[test]
    fn filter_with_no_match_is_empty() {
        assert!(filter_block_commands("zzz", BLOCK_COMMANDS).is_empty());
    }

    #[test]
    fn cycle_wraps_both_directions() {
        assert_eq!(cycle_index(0, 3, true), 1);
        assert_eq!(cycle_index(2, 3, true), 0);
        assert_eq!(cycle_index(0, 3, false), 2);
        assert_eq!(cycle_index(0, 0, true), 0);
    }
}
