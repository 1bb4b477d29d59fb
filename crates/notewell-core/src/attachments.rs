use crate::blocks::{Block, BlockProperties, BlockType};
use serde::{Deserialize, Serialize};

/// What the Upload Service eventually resolves to. Written to the block
/// wholesale or not at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub file_name: String,
    pub file_url: String,
    pub file_size: u64,
    pub file_type: String,
}

#[derive(Debug)]
pub enum UploadError {
    Rejected(String),
    TooLarge { size: u64, limit: u64 },
    Io(std::io::Error),
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentState {
    Empty,
    Attached,
}

/// Derived from properties; there is no separately modeled uploading state,
/// the host blocks interaction until the service resolves.
pub fn attachment_state(block: &Block) -> AttachmentState {
    if block.kind != BlockType::File {
        return AttachmentState::Empty;
    }
    match &block.properties {
        BlockProperties::File { file_url, .. } if !file_url.is_empty() => {
            AttachmentState::Attached
        }
        _ => AttachmentState::Empty,
    }
}

pub fn apply_metadata(block: &mut Block, metadata: FileMetadata) {
    block.properties = BlockProperties::File {
        file_name: metadata.file_name,
        file_url: metadata.file_url,
        file_size: metadata.file_size,
        file_type: metadata.file_type,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_block() -> Block {
        Block::new(BlockType::File)
    }

    #[test]
    fn fresh_file_block_is_empty() {
        assert_eq!(attachment_state(&file_block()), AttachmentState::Empty);
    }

    #[test]
    fn metadata_moves_block_to_attached() {
        let mut block = file_block();
        apply_metadata(
            &mut block,
            FileMetadata {
                file_name: "notes.pdf".to_string(),
                file_url: "https://files.example/abc".to_string(),
                file_size: 1024,
                file_type: "application/pdf".to_string(),
            },
        );
        assert_eq!(attachment_state(&block), AttachmentState::Attached);
    }

    #[test]
    fn non_file_blocks_are_never_attached() {
        let mut block = Block::new(BlockType::Paragraph);
        block.properties = BlockProperties::File {
            file_name: "stray".to_string(),
            file_url: "https://files.example/stray".to_string(),
            file_size: 1,
            file_type: "text/plain".to_string(),
        };
        assert_eq!(attachment_state(&block), AttachmentState::Empty);
    }

    #[test]
    fn empty_url_counts_as_empty() {
        let mut block = file_block();
        block.properties = BlockProperties::File {
            file_name: String::new(),
            file_url: String::new(),
            file_size: 0,
            file_type: String::new(),
        };
        assert_eq!(attachment_state(&block), AttachmentState::Empty);
    }
}
