//! Label allocation
//!
//! Every control construct draws one number from its own counter and derives
//! all of its labels from that number, so labels never collide within a
//! compilation. The allocator is owned by the generator; a fresh allocator
//! restarts numbering at zero.

/// Construct a label belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    If,
    Elif,
    Else,
    While,
    And,
    Or,
    Not,
}

impl LabelKind {
    const COUNT: usize = 7;

    pub fn prefix(self) -> &'static str {
        match self {
            LabelKind::If => "if",
            LabelKind::Elif => "elif",
            LabelKind::Else => "else",
            LabelKind::While => "while",
            LabelKind::And => "and",
            LabelKind::Or => "or",
            LabelKind::Not => "not",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Labels of one construct instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGroup {
    kind: LabelKind,
    number: u32,
}

impl LabelGroup {
    /// `<prefix>_<part>_<n>`
    pub fn name(&self, part: &str) -> String {
        format!("{}_{}_{}", self.kind.prefix(), part, self.number)
    }

    pub fn number(&self) -> u32 {
        self.number
    }
}

/// Independent monotonically increasing counters, one per [`LabelKind`]
#[derive(Debug, Clone, Default)]
pub struct LabelAllocator {
    counters: [u32; LabelKind::COUNT],
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next number for `kind`
    pub fn next(&mut self, kind: LabelKind) -> LabelGroup {
        let counter = &mut self.counters[kind.index()];
        let number = *counter;
        *counter += 1;
        LabelGroup { kind, number }
    }
}
