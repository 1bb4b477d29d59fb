use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    Todo,
    Toggle,
    Code,
    Quote,
    Callout,
    Divider,
    Image,
    File,
    Table,
}

impl BlockType {
    pub fn is_paragraph(&self) -> bool {
        matches!(self, BlockType::Paragraph)
    }

    /// Dividers carry no textual payload; their presence in the document is
    /// the whole point.
    pub fn has_content(&self) -> bool {
        !matches!(self, BlockType::Divider)
    }
}

/// Type-specific payload. Lives in its own field next to `kind`, so a retype
/// leaves the previous variant in place rather than deleting it. Data from an
/// accidental retype survives a retype back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockProperties {
    #[default]
    None,
    Todo {
        checked: bool,
    },
    Toggle {
        expanded: bool,
    },
    Callout {
        color: String,
    },
    Image {
        url: String,
    },
    File {
        file_name: String,
        file_url: String,
        file_size: u64,
        file_type: String,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub content: String,
    #[serde(default)]
    pub properties: BlockProperties,
}

impl Block {
    pub fn new(kind: BlockType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: String::new(),
            properties: BlockProperties::default(),
        }
    }

    pub fn with_content(kind: BlockType, content: impl Into<String>) -> Self {
        let mut block = Self::new(kind);
        block.content = content.into();
        block
    }
}
