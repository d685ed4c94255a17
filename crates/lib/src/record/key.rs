//! Record keys and the shared text serialization.

use std::fmt;

/// The database a record set is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Passwd,
    Shadow,
    Group,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Passwd, Category::Shadow, Category::Group];

    /// Base name shared by the text and database artifacts.
    pub fn name(self) -> &'static str {
        match self {
            Category::Passwd => "passwd",
            Category::Shadow => "shadow",
            Category::Group => "group",
        }
    }

    /// Whether the artifacts must be unreadable by anyone but the owner.
    pub fn is_private(self) -> bool {
        matches!(self, Category::Shadow)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which index a key line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Numeric uid or gid.
    Id,
    /// Position in the record set, used for enumeration.
    Index,
    /// User or group name.
    Name,
}

impl KeyKind {
    pub const ALL: [KeyKind; 3] = [KeyKind::Id, KeyKind::Index, KeyKind::Name];

    pub fn prefix(self) -> char {
        match self {
            KeyKind::Id => '=',
            KeyKind::Index => '0',
            KeyKind::Name => '.',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '=' => Some(KeyKind::Id),
            '0' => Some(KeyKind::Index),
            '.' => Some(KeyKind::Name),
            _ => None,
        }
    }
}

/// A lookup key as written to the text artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(u32),
    Index(usize),
    Name(String),
}

impl RecordKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            RecordKey::Id(_) => KeyKind::Id,
            RecordKey::Index(_) => KeyKind::Index,
            RecordKey::Name(_) => KeyKind::Name,
        }
    }

    /// Parse the key column of a text artifact line.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let kind = KeyKind::from_prefix(chars.next()?)?;
        let rest = chars.as_str();
        match kind {
            KeyKind::Id => rest.parse().ok().map(RecordKey::Id),
            KeyKind::Index => rest.parse().ok().map(RecordKey::Index),
            KeyKind::Name if !rest.is_empty() => Some(RecordKey::Name(rest.to_string())),
            KeyKind::Name => None,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.kind().prefix();
        match self {
            RecordKey::Id(id) => write!(f, "{prefix}{id}"),
            RecordKey::Index(index) => write!(f, "{prefix}{index}"),
            RecordKey::Name(name) => write!(f, "{prefix}{name}"),
        }
    }
}

/// One compiled entity: its id, its name and the payload all three keys map to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub payload: String,
}

impl Record {
    /// The three keys for this record at position `index` of its set.
    pub fn keys(&self, index: usize) -> [RecordKey; 3] {
        [
            RecordKey::Id(self.id),
            RecordKey::Index(index),
            RecordKey::Name(self.name.clone()),
        ]
    }
}

/// The ordered records of one category.
///
/// A record's enumeration index is its position in the set, so the counter
/// advances once per entity and never reflects the entity's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    category: Category,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            records: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize as `makedb` input: one `<key> <payload>` line per key.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (index, record) in self.records.iter().enumerate() {
            for key in record.keys(index) {
                out.push_str(&key.to_string());
                out.push(' ');
                out.push_str(&record.payload);
                out.push('\n');
            }
        }
        out
    }
}
