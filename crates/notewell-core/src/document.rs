use crate::blocks::{Block, BlockProperties, BlockType};
use tracing::debug;
use uuid::Uuid;

/// Where the caret should land after a structural mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusTarget {
    pub block_id: String,
    pub offset: usize,
}

/// Ordered block sequence for one editing session. Insertion order is the
/// document's reading order. The sequence is never empty while being edited.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.ensure_non_empty();
        doc
    }

    pub fn ensure_non_empty(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::new(BlockType::Paragraph));
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    /// Inserts a fresh empty block immediately after `index`. Existing blocks
    /// are untouched; the caller is responsible for focusing the new surface.
    pub fn insert_after(&mut self, index: usize, kind: BlockType) -> &Block {
        let insert_ix = (index + 1).min(self.blocks.len());
        self.blocks.insert(insert_ix, Block::new(kind));
        &self.blocks[insert_ix]
    }

    /// Removes the block. Refused when it is the only block; unknown ids are
    /// absorbed. On success the preceding block (or the new first block)
    /// becomes the focus target, caret at its end.
    pub fn delete(&mut self, id: &str) -> Option<FocusTarget> {
        if self.blocks.len() <= 1 {
            debug!(block_id = id, "refusing to delete the last block");
            return None;
        }
        let Some(ix) = self.index_of(id) else {
            debug!(block_id = id, "delete target not found");
            return None;
        };
        self.blocks.remove(ix);
        let focus_ix = ix.saturating_sub(1);
        let target = &self.blocks[focus_ix];
        Some(FocusTarget {
            block_id: target.id.clone(),
            offset: target.content.len(),
        })
    }

    /// Clones a block (fresh id, same kind/content/properties) immediately
    /// after the original.
    pub fn duplicate(&mut self, id: &str) -> Option<&Block> {
        let ix = self.index_of(id)?;
        let source = &self.blocks[ix];
        let clone = Block {
            id: Uuid::new_v4().to_string(),
            kind: source.kind,
            content: source.content.clone(),
            properties: source.properties.clone(),
        };
        self.blocks.insert(ix + 1, clone);
        Some(&self.blocks[ix + 1])
    }

    pub fn move_up(&mut self, id: &str) -> bool {
        let Some(ix) = self.index_of(id) else {
            return false;
        };
        if ix == 0 {
            return false;
        }
        self.blocks.swap(ix - 1, ix);
        true
    }

    pub fn move_down(&mut self, id: &str) -> bool {
        let Some(ix) = self.index_of(id) else {
            return false;
        };
        if ix + 1 >= self.blocks.len() {
            return false;
        }
        self.blocks.swap(ix, ix + 1);
        true
    }

    /// Replaces `kind` only. Content and properties stay as they are; a
    /// property variant irrelevant to the new kind is inert, not deleted.
    pub fn change_type(&mut self, id: &str, kind: BlockType) -> bool {
        let Some(block) = self.get_mut(id) else {
            debug!(block_id = id, "change_type target not found");
            return false;
        };
        block.kind = kind;
        true
    }

    /// Removes the dragged block and reinserts it at the target's
    /// pre-removal slot, so the dragged block takes the target's place and
    /// the target shifts by one.
    pub fn move_to_slot(&mut self, dragged_id: &str, target_id: &str) -> bool {
        if dragged_id == target_id {
            return false;
        }
        let Some(dragged_ix) = self.index_of(dragged_id) else {
            return false;
        };
        let Some(target_ix) = self.index_of(target_id) else {
            return false;
        };
        let block = self.blocks.remove(dragged_ix);
        let insert_ix = target_ix.min(self.blocks.len());
        self.blocks.insert(insert_ix, block);
        true
    }

    pub fn set_todo_checked(&mut self, id: &str, checked: bool) -> bool {
        let Some(block) = self.get_mut(id) else {
            return false;
        };
        if block.kind != BlockType::Todo {
            return false;
        }
        block.properties = BlockProperties::Todo { checked };
        true
    }

    pub fn set_toggle_expanded(&mut self, id: &str, expanded: bool) -> bool {
        let Some(block) = self.get_mut(id) else {
            return false;
        };
        if block.kind != BlockType::Toggle {
            return false;
        }
        block.properties = BlockProperties::Toggle { expanded };
        true
    }

    pub fn set_callout_color(&mut self, id: &str, color: &str) -> bool {
        let Some(block) = self.get_mut(id) else {
            return false;
        };
        if block.kind != BlockType::Callout {
            return false;
        }
        block.properties = BlockProperties::Callout {
            color: color.to_string(),
        };
        true
    }

    pub fn set_table_rows(&mut self, id: &str, rows: Vec<Vec<String>>) -> bool {
        let Some(block) = self.get_mut(id) else {
            return false;
        };
        if block.kind != BlockType::Table {
            return false;
        }
        block.properties = BlockProperties::Table { rows };
        true
    }
}
