use std::fmt;

/// Bytes placed from one `#ORG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub start: u32,
    pub bytes: Vec<u8>,
}

impl CodeBlock {
    /// One past the last byte.
    pub fn end(&self) -> u64 {
        self.start as u64 + self.bytes.len() as u64
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn contains(&self, addr: u64) -> bool {
        self.start as u64 <= addr && addr < self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// The block lies completely inside the other one.
    Inclusion,
    /// The block starts inside the other one.
    PartialUp,
    /// The block ends inside the other one.
    PartialDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub kind: CollisionKind,
    pub block: usize,
    pub other: usize,
    pub block_start: u32,
    pub other_start: u32,
    /// Overlapping byte count.
    pub overlap: u64,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let how = match self.kind {
            CollisionKind::Inclusion => "lies inside",
            CollisionKind::PartialUp => "partially overlaps (start inside)",
            CollisionKind::PartialDown => "partially overlaps (end inside)",
        };
        write!(
            f,
            "Block at 0x{:06X} {} block at 0x{:06X}: {} byte(s) overlap",
            self.block_start, how, self.other_start, self.overlap
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Blocks(Vec<CodeBlock>);

impl Blocks {
    pub fn new() -> Self {
        Blocks(Vec::new())
    }

    /// Start a new block; returns its index.
    pub fn open(&mut self, start: u32) -> usize {
        self.0.push(CodeBlock {
            start,
            bytes: vec![],
        });
        self.0.len() - 1
    }

    pub fn fill(&mut self, index: usize, bytes: &[u8]) {
        if let Some(block) = self.0.get_mut(index) {
            block.bytes.extend_from_slice(bytes);
        }
    }

    pub fn clear_bytes(&mut self) {
        for block in &mut self.0 {
            block.bytes.clear();
        }
    }

    pub fn get(&self, index: usize) -> Option<&CodeBlock> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeBlock> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every ordered pair of non-empty blocks.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut found = vec![];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in self.0.iter().enumerate() {
                if i == j || a.is_empty() || b.is_empty() {
                    continue;
                }
                let (a_start, a_end) = (a.start as u64, a.end());
                let (b_start, b_end) = (b.start as u64, b.end());
                let hit = if a_start >= b_start && a_end <= b_end {
                    Some((CollisionKind::Inclusion, a_end - a_start))
                } else if b.contains(a_start) {
                    Some((CollisionKind::PartialUp, b_end - a_start))
                } else if b.contains(a_end - 1) {
                    Some((CollisionKind::PartialDown, a_end - b_start))
                } else {
                    None
                };
                if let Some((kind, overlap)) = hit {
                    found.push(Collision {
                        kind,
                        block: i,
                        other: j,
                        block_start: a.start,
                        other_start: b.start,
                        overlap,
                    });
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(ranges: &[(u32, usize)]) -> Blocks {
        let mut blocks = Blocks::new();
        for (start, len) in ranges {
            let idx = blocks.open(*start);
            blocks.fill(idx, &vec![0; *len]);
        }
        blocks
    }

    #[test]
    fn test_disjoint() {
        assert!(blocks(&[(0, 0x10), (0x10, 0x10), (0x100, 1)]).collisions().is_empty());
    }

    #[test]
    fn test_partial() {
        let found = blocks(&[(0x00, 0x10), (0x08, 0x10)]).collisions();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, CollisionKind::PartialDown);
        assert_eq!(found[1].kind, CollisionKind::PartialUp);
        assert_eq!(found[1].block_start, 0x08);
        assert_eq!(found[1].other_start, 0x00);
        assert_eq!(found[1].overlap, 8);
        let text = found[1].to_string();
        assert!(text.contains("0x000008") && text.contains("0x000000") && text.contains("8 byte"));
    }

    #[test]
    fn test_inclusion() {
        let found = blocks(&[(0x00, 0x20), (0x04, 0x04)]).collisions();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, CollisionKind::Inclusion);
        assert_eq!(found[0].block, 1);
        assert_eq!(found[0].overlap, 4);
    }

    #[test]
    fn test_empty_blocks_never_collide() {
        assert!(blocks(&[(0x00, 0x20), (0x04, 0)]).collisions().is_empty());
    }
}
