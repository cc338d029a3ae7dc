/// One `Table name { ... }` block as it appears in the source, before any
/// cross-table resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub name: String,
    pub lines: Vec<FieldLine>,
}

/// A trimmed, non-blank line of a table body split into its name and the raw
/// definition text that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLine {
    pub name: String,
    pub definition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// `>`: many-to-one, drawn as an arrow towards the target.
    #[serde(rename = ">")]
    ManyToOne,
    /// `<`: the reverse link.
    #[serde(rename = "<")]
    OneToMany,
}

impl Direction {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::ManyToOne),
            '<' => Some(Self::OneToMany),
            _ => None,
        }
    }
}

/// A syntactically valid `[ref: <dir> <table>.<field>]` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefAnnotation {
    pub direction: Direction,
    pub table: String,
    pub field: String,
}
