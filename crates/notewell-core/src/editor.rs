use crate::attachments::{self, AttachmentState, FileMetadata, UploadError};
use crate::blocks::{Block, BlockProperties, BlockType};
use crate::document::{Document, FocusTarget};
use crate::drag::DragState;
use crate::notices::{self, Notice};
use crate::slash::{
    cycle_index, filter_block_commands, find_slash_query, BlockCommandDef, SlashMenuState,
    BLOCK_COMMANDS,
};
use crate::surface::{SurfaceRegistry, TextSurface};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Escape,
    Tab,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

type ChangeHandler = Box<dyn FnMut(&[Block])>;

const MAX_NOTICES: usize = 200;

/// One editing session over one document. All mutations run synchronously in
/// response to a single input event; the upload completion callback is the
/// only late arrival and is id-checked before it may touch the model.
pub struct Editor {
    doc: Document,
    surfaces: SurfaceRegistry,
    slash_menu: SlashMenuState,
    drag: DragState,
    notices: Vec<Notice>,
    read_only: bool,
    pending_focus: Option<FocusTarget>,
    on_change: Option<ChangeHandler>,
}

impl Editor {
    /// Takes ownership of the loaded blocks for the session. With
    /// `read_only` the engine is a pure renderer: every mutation entry point
    /// below becomes unreachable.
    pub fn new(blocks: Vec<Block>, read_only: bool) -> Self {
        Self {
            doc: Document::new(blocks),
            surfaces: SurfaceRegistry::new(),
            slash_menu: SlashMenuState::closed(),
            drag: DragState::new(),
            notices: Vec::new(),
            read_only,
            pending_focus: None,
            on_change: None,
        }
    }

    pub fn set_on_change(&mut self, handler: impl FnMut(&[Block]) + 'static) {
        self.on_change = Some(Box::new(handler));
    }

    pub fn blocks(&self) -> &[Block] {
        &self.doc.blocks
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if read_only {
            self.slash_menu = SlashMenuState::closed();
            self.drag.end();
        }
    }

    fn emit_change(&mut self) {
        if let Some(handler) = self.on_change.as_mut() {
            handler(&self.doc.blocks);
        }
    }

    // --- surfaces -----------------------------------------------------------

    /// Binds a surface to a block (push-if-stale applies). Unknown ids are
    /// absorbed.
    pub fn bind_surface(&mut self, block_id: &str, surface: Box<dyn TextSurface>) -> bool {
        let Some(block) = self.doc.get(block_id) else {
            debug!(block_id, "bind requested for unknown block");
            return false;
        };
        self.surfaces.bind(block, surface);
        true
    }

    pub fn unbind_surface(&mut self, block_id: &str) {
        self.surfaces.unbind(block_id);
    }

    pub fn surface(&self, block_id: &str) -> Option<&dyn TextSurface> {
        self.surfaces.get(block_id)
    }

    /// Re-asserts canonical content into all bound surfaces, stale ones only.
    pub fn refresh_surfaces(&mut self) {
        self.surfaces.push_all(&self.doc.blocks);
    }

    /// Pull-on-blur: commits the surface's live text into the model. The one
    /// moment the model is guaranteed consistent with what the user typed.
    pub fn handle_blur(&mut self, block_id: &str) {
        if self.slash_menu.is_open_for(block_id) {
            self.slash_menu = SlashMenuState::closed();
        }
        if self.read_only {
            return;
        }
        if self.flush_surface(block_id) {
            self.emit_change();
        }
    }

    fn flush_surface(&mut self, block_id: &str) -> bool {
        let Some(block) = self.doc.get_mut(block_id) else {
            return false;
        };
        self.surfaces.pull(block)
    }

    /// The host drains this at the next rendering opportunity; structural
    /// mutations cannot focus inline because the target surface does not
    /// exist yet.
    pub fn take_pending_focus(&mut self) -> Option<FocusTarget> {
        self.pending_focus.take()
    }

    // --- keyboard flow ------------------------------------------------------

    /// Returns true when the key was consumed; everything else stays with the
    /// native surface.
    pub fn handle_key_down(&mut self, block_id: &str, event: KeyEvent) -> bool {
        if self.read_only {
            return false;
        }
        if self.slash_menu.is_open_for(block_id) {
            match event.key {
                Key::Escape => {
                    self.slash_menu = SlashMenuState::closed();
                    return true;
                }
                Key::Up | Key::Down => {
                    let len = self.filtered_slash_commands().len();
                    if len > 0 {
                        self.slash_menu.selected_index =
                            cycle_index(self.slash_menu.selected_index, len, event.key == Key::Down);
                    }
                    return true;
                }
                Key::Tab => {
                    let len = self.filtered_slash_commands().len();
                    if len > 0 {
                        self.slash_menu.selected_index =
                            cycle_index(self.slash_menu.selected_index, len, !event.shift);
                    }
                    return true;
                }
                Key::Enter => {
                    // Zero candidates: the host shows "no results", Enter
                    // does nothing but must not fall through to a split.
                    self.commit_slash_selection();
                    return true;
                }
                Key::Backspace => return false,
            }
        }
        match event.key {
            Key::Enter if !event.shift => self.insert_block_below(block_id).is_some(),
            Key::Backspace => self.delete_if_blank(block_id),
            Key::Up => self.focus_neighbor_at_edge(block_id, false),
            Key::Down => self.focus_neighbor_at_edge(block_id, true),
            _ => false,
        }
    }

    /// Enter: a new empty paragraph goes in below; the current block's text
    /// is not divided at the caret. Intentional source behavior, kept as-is.
    pub fn insert_block_below(&mut self, block_id: &str) -> Option<String> {
        if self.read_only {
            return None;
        }
        let ix = self.doc.index_of(block_id)?;
        self.flush_surface(block_id);
        let new_id = self.doc.insert_after(ix, BlockType::Paragraph).id.clone();
        self.slash_menu = SlashMenuState::closed();
        self.pending_focus = Some(FocusTarget {
            block_id: new_id.clone(),
            offset: 0,
        });
        self.emit_change();
        Some(new_id)
    }

    fn delete_if_blank(&mut self, block_id: &str) -> bool {
        let live = self
            .surfaces
            .get(block_id)
            .map(|surface| surface.text())
            .or_else(|| self.doc.get(block_id).map(|block| block.content.clone()));
        let Some(text) = live else {
            return false;
        };
        if !text.trim().is_empty() {
            return false;
        }
        let Some(focus) = self.doc.delete(block_id) else {
            return false;
        };
        self.surfaces.unbind(block_id);
        self.slash_menu = SlashMenuState::closed();
        self.pending_focus = Some(focus);
        self.emit_change();
        true
    }

    fn focus_neighbor_at_edge(&mut self, block_id: &str, forward: bool) -> bool {
        let Some(surface) = self.surfaces.get(block_id) else {
            return false;
        };
        let cursor = surface.cursor();
        let text_len = surface.text().len();
        let Some(ix) = self.doc.index_of(block_id) else {
            return false;
        };
        let target = if forward {
            if cursor != text_len {
                return false;
            }
            let Some(next) = self.doc.blocks.get(ix + 1) else {
                return false;
            };
            FocusTarget {
                block_id: next.id.clone(),
                offset: next.content.len(),
            }
        } else {
            if cursor != 0 || ix == 0 {
                return false;
            }
            FocusTarget {
                block_id: self.doc.blocks[ix - 1].id.clone(),
                offset: 0,
            }
        };
        self.slash_menu = SlashMenuState::closed();
        self.pending_focus = Some(target);
        true
    }

    // --- slash command engine -----------------------------------------------

    /// Called after every observed character-level edit so the engine can
    /// track the trigger. Opens, refilters, or closes the menu.
    pub fn handle_text_input(&mut self, block_id: &str) {
        if self.read_only {
            return;
        }
        let Some(surface) = self.surfaces.get(block_id) else {
            self.slash_menu = SlashMenuState::closed();
            return;
        };
        let text = surface.text();
        let cursor = surface.cursor();
        match find_slash_query(&text, cursor) {
            Some(found) => {
                let same_anchor = self.slash_menu.is_open_for(block_id)
                    && self.slash_menu.slash_index == Some(found.slash_index);
                let anchor = if same_anchor {
                    self.slash_menu.anchor
                } else {
                    surface.caret_anchor()
                };
                self.slash_menu = SlashMenuState {
                    open: true,
                    block_id: Some(block_id.to_string()),
                    slash_index: Some(found.slash_index),
                    query: found.query,
                    selected_index: 0,
                    anchor,
                };
            }
            None => self.slash_menu = SlashMenuState::closed(),
        }
    }

    pub fn slash_menu(&self) -> &SlashMenuState {
        &self.slash_menu
    }

    pub fn filtered_slash_commands(&self) -> Vec<&'static BlockCommandDef> {
        filter_block_commands(&self.slash_menu.query, BLOCK_COMMANDS)
    }

    pub fn cancel_slash_menu(&mut self) {
        self.slash_menu = SlashMenuState::closed();
    }

    /// Commits the highlighted candidate (Enter). No-op when the filter
    /// matches nothing.
    pub fn commit_slash_selection(&mut self) {
        if !self.slash_menu.open {
            return;
        }
        let commands = self.filtered_slash_commands();
        if commands.is_empty() {
            return;
        }
        let selected = self.slash_menu.selected_index.min(commands.len() - 1);
        let command = *commands[selected];
        self.apply_block_command(&command);
    }

    /// Commits a clicked candidate by its position in the filtered list.
    pub fn commit_slash_candidate(&mut self, index: usize) {
        if !self.slash_menu.open {
            return;
        }
        let commands = self.filtered_slash_commands();
        let Some(command) = commands.get(index).copied().copied() else {
            return;
        };
        self.apply_block_command(&command);
    }

    fn apply_block_command(&mut self, command: &BlockCommandDef) {
        let Some(block_id) = self.slash_menu.block_id.clone() else {
            return;
        };
        let Some(slash_index) = self.slash_menu.slash_index else {
            return;
        };
        let query_len = self.slash_menu.query.len();

        // Live surface text wins while the block is focused.
        let text = self
            .surfaces
            .get(&block_id)
            .map(|surface| surface.text())
            .or_else(|| self.doc.get(&block_id).map(|block| block.content.clone()));
        let Some(text) = text else {
            self.slash_menu = SlashMenuState::closed();
            return;
        };

        let strip_end = slash_index + 1 + query_len;
        if strip_end > text.len()
            || !text.is_char_boundary(slash_index)
            || !text.is_char_boundary(strip_end)
            || !text[slash_index..].starts_with('/')
        {
            // The trigger moved out from under us; the menu lost relevance.
            self.slash_menu = SlashMenuState::closed();
            return;
        }

        let next_text = format!("{}{}", &text[..slash_index], &text[strip_end..]);
        {
            let Some(block) = self.doc.get_mut(&block_id) else {
                self.slash_menu = SlashMenuState::closed();
                return;
            };
            block.content = next_text;
            block.kind = command.kind;
        }
        if let Some(block) = self.doc.get(&block_id) {
            self.surfaces.push_if_stale(block);
        }
        if let Some(surface) = self.surfaces.get_mut(&block_id) {
            surface.set_cursor(slash_index);
        }
        self.slash_menu = SlashMenuState::closed();
        self.pending_focus = Some(FocusTarget {
            block_id,
            offset: slash_index,
        });
        self.emit_change();
    }

    // --- block operations (host-facing) -------------------------------------

    pub fn delete_block(&mut self, block_id: &str) -> bool {
        if self.read_only {
            return false;
        }
        let Some(focus) = self.doc.delete(block_id) else {
            return false;
        };
        self.surfaces.unbind(block_id);
        self.slash_menu = SlashMenuState::closed();
        self.pending_focus = Some(focus);
        self.emit_change();
        true
    }

    pub fn duplicate_block(&mut self, block_id: &str) -> Option<String> {
        if self.read_only {
            return None;
        }
        self.flush_surface(block_id);
        let clone = self.doc.duplicate(block_id)?;
        let clone_id = clone.id.clone();
        let offset = clone.content.len();
        self.pending_focus = Some(FocusTarget {
            block_id: clone_id.clone(),
            offset,
        });
        self.emit_change();
        Some(clone_id)
    }

    pub fn move_block_up(&mut self, block_id: &str) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.move_up(block_id) {
            return false;
        }
        self.refresh_surfaces();
        self.emit_change();
        true
    }

    pub fn move_block_down(&mut self, block_id: &str) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.move_down(block_id) {
            return false;
        }
        self.refresh_surfaces();
        self.emit_change();
        true
    }

    pub fn change_block_type(&mut self, block_id: &str, kind: BlockType) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.change_type(block_id, kind) {
            return false;
        }
        self.emit_change();
        true
    }

    pub fn set_todo_checked(&mut self, block_id: &str, checked: bool) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.set_todo_checked(block_id, checked) {
            return false;
        }
        self.emit_change();
        true
    }

    pub fn set_toggle_expanded(&mut self, block_id: &str, expanded: bool) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.set_toggle_expanded(block_id, expanded) {
            return false;
        }
        self.emit_change();
        true
    }

    pub fn set_callout_color(&mut self, block_id: &str, color: &str) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.set_callout_color(block_id, color) {
            return false;
        }
        self.emit_change();
        true
    }

    pub fn set_table_rows(&mut self, block_id: &str, rows: Vec<Vec<String>>) -> bool {
        if self.read_only {
            return false;
        }
        if !self.doc.set_table_rows(block_id, rows) {
            return false;
        }
        self.emit_change();
        true
    }

    // --- drag reorder -------------------------------------------------------

    pub fn drag_start(&mut self, block_id: &str) {
        if self.read_only {
            return;
        }
        if self.doc.index_of(block_id).is_none() {
            debug!(block_id, "drag start on unknown block");
            return;
        }
        self.drag.start(block_id);
    }

    /// True while a drag is live so the host can suppress the platform's
    /// default drop rejection. Never mutates the model.
    pub fn drag_over(&self, target_id: &str) -> bool {
        !self.read_only && self.drag.over(target_id)
    }

    pub fn drop_on(&mut self, target_id: &str) -> bool {
        if self.read_only {
            self.drag.end();
            return false;
        }
        let Some(dragged_id) = self.drag.take() else {
            return false;
        };
        if dragged_id == target_id {
            return false;
        }
        if !self.doc.move_to_slot(&dragged_id, target_id) {
            debug!(
                dragged_id = %dragged_id,
                target_id,
                "drop target or source vanished; reorder dropped"
            );
            return false;
        }
        self.refresh_surfaces();
        self.emit_change();
        true
    }

    /// Clears the drag unconditionally; covers cancellation without a drop.
    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    pub fn dragged_block(&self) -> Option<&str> {
        self.drag.dragged_id.as_deref()
    }

    // --- file attachments ---------------------------------------------------

    pub fn attachment_state(&self, block_id: &str) -> Option<AttachmentState> {
        self.doc.get(block_id).map(attachments::attachment_state)
    }

    /// Upload Service completion callback. A block deleted while the upload
    /// was in flight is a safe no-op; failures never write partial metadata.
    pub fn complete_upload(
        &mut self,
        block_id: &str,
        result: Result<FileMetadata, UploadError>,
    ) {
        if self.read_only {
            return;
        }
        match result {
            Ok(metadata) => {
                let Some(block) = self.doc.get_mut(block_id) else {
                    debug!(block_id, "upload resolved after block deletion; dropped");
                    return;
                };
                if block.kind != BlockType::File {
                    warn!(block_id, "upload resolved for a non-file block; dropped");
                    return;
                }
                attachments::apply_metadata(block, metadata);
                self.emit_change();
            }
            Err(err) => {
                warn!(block_id, error = ?err, "upload failed");
                self.push_notice(Notice::upload_error(format!("{err:?}")));
            }
        }
    }

    pub fn remove_attachment(&mut self, block_id: &str) -> bool {
        if self.read_only {
            return false;
        }
        let Some(block) = self.doc.get_mut(block_id) else {
            return false;
        };
        if block.kind != BlockType::File {
            return false;
        }
        block.properties = BlockProperties::None;
        self.emit_change();
        true
    }

    // --- notices ------------------------------------------------------------

    fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            let overflow = self.notices.len() - MAX_NOTICES;
            self.notices.drain(0..overflow);
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn dismiss_notice(&mut self, notice_id: &str) -> bool {
        let before = self.notices.len();
        self.notices.retain(|notice| notice.id != notice_id);
        self.notices.len() != before
    }

    pub fn unread_notice_count(&self) -> usize {
        notices::unread_count(&self.notices)
    }

    pub fn mark_notices_read(&mut self) {
        notices::mark_all_read(&mut self.notices);
    }
}
