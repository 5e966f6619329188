//! Result and location types shared by all crates

use std::fmt::{self, Debug, Formatter};

/// Result that can be returned which holds either T or an Error
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Position inside a source string (a selector, mostly)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Byte offset, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Computes the location of `offset` bytes into `source`
    #[must_use]
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for ch in source[..offset].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Self::new(line, column, offset)
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_from_offset() {
        let loc = Location::from_offset("div\n  > span", 7);
        assert_eq!(loc, Location::new(2, 4, 7));

        let loc = Location::from_offset("abc", 100);
        assert_eq!(loc.offset, 3);
        assert_eq!(format!("{loc:?}"), "(1:4)");
    }
}
