/// Drag reorder state. The id is recorded on drag start and cleared on drop
/// or drag end, whether or not a drop landed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    pub dragged_id: Option<String>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, block_id: &str) {
        self.dragged_id = Some(block_id.to_string());
    }

    /// True while a drag is live; the host uses this to suppress the
    /// platform's default drop rejection. No model mutation happens here.
    pub fn over(&self, _target_id: &str) -> bool {
        self.dragged_id.is_some()
    }

    pub fn take(&mut self) -> Option<String> {
        self.dragged_id.take()
    }

    pub fn end(&mut self) {
        self.dragged_id = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged_id.is_some()
    }
}
