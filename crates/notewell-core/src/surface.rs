use crate::blocks::Block;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Screen-space point used to anchor the slash menu near the caret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuAnchor {
    pub x: f32,
    pub y: f32,
}

/// One live editable widget bound to one block. The host substitutes its
/// native text widget behind this trait; while a surface holds focus its
/// text is the truth for that block, not the model's `content`.
pub trait TextSurface {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, offset: usize);
    fn caret_anchor(&self) -> Option<MenuAnchor> {
        None
    }
}

/// Walks `cursor` back to the nearest char boundary at or before it.
pub fn clamp_to_char_boundary(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while cursor > 0 && !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Per-block surface bindings. Enforces push-if-stale on (re)bind and
/// pull-on-blur when the host reports a surface losing focus.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, Box<dyn TextSurface>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a surface to a block. The canonical content is written into the
    /// surface only when the surface's current text differs, so binding never
    /// disturbs an in-progress edit or the caret.
    pub fn bind(&mut self, block: &Block, mut surface: Box<dyn TextSurface>) {
        if surface.text() != block.content {
            surface.set_text(&block.content);
        }
        self.surfaces.insert(block.id.clone(), surface);
    }

    pub fn unbind(&mut self, block_id: &str) -> Option<Box<dyn TextSurface>> {
        self.surfaces.remove(block_id)
    }

    pub fn get(&self, block_id: &str) -> Option<&dyn TextSurface> {
        self.surfaces.get(block_id).map(|surface| surface.as_ref())
    }

    pub fn get_mut(&mut self, block_id: &str) -> Option<&mut Box<dyn TextSurface>> {
        self.surfaces.get_mut(block_id)
    }

    pub fn is_bound(&self, block_id: &str) -> bool {
        self.surfaces.contains_key(block_id)
    }

    /// Re-asserts the model's content into every bound surface, writing only
    /// where the surface text is stale. Called after structural mutations.
    pub fn push_all(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.push_if_stale(block);
        }
    }

    pub fn push_if_stale(&mut self, block: &Block) {
        if let Some(surface) = self.surfaces.get_mut(&block.id) {
            if surface.text() != block.content {
                surface.set_text(&block.content);
            }
        }
    }

    /// Reads a surface's live text back into the block. Returns true when
    /// the model changed. This is the single authoritative commit point for
    /// text edits.
    pub fn pull(&self, block: &mut Block) -> bool {
        let Some(surface) = self.surfaces.get(&block.id) else {
            debug!(block_id = %block.id, "pull requested for unbound block");
            return false;
        };
        let live = surface.text();
        if live == block.content {
            return false;
        }
        block.content = live;
        true
    }
}

/// Plain in-memory surface for headless hosts and tests. Wrap it in
/// `Rc<RefCell<...>>` when the host needs to keep a handle after handing the
/// surface to the editor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BufferSurface {
    pub text: String,
    pub cursor: usize,
    pub anchor: Option<MenuAnchor>,
}

impl BufferSurface {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self {
            text,
            cursor,
            anchor: None,
        }
    }
}

impl TextSurface for BufferSurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.cursor.min(self.text.len());
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.cursor = clamp_to_char_boundary(&self.text, offset);
    }

    fn caret_anchor(&self) -> Option<MenuAnchor> {
        self.anchor
    }
}

impl TextSurface for Rc<RefCell<BufferSurface>> {
    fn text(&self) -> String {
        self.borrow().text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.borrow_mut().set_text(text);
    }

    fn cursor(&self) -> usize {
        self.borrow().cursor
    }

    fn set_cursor(&mut self, offset: usize) {
        self.borrow_mut().set_cursor(offset);
    }

    fn caret_anchor(&self) -> Option<MenuAnchor> {
        self.borrow().anchor
    }
}
