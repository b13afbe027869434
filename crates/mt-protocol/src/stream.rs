//! Stream selector carried in every frame header

use std::fmt;

/// Logical stream a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StreamKind {
    /// Standard input (never produced by the client side)
    Stdin = 0,
    /// Standard output
    Stdout = 1,
    /// Standard error
    Stderr = 2,
}

impl StreamKind {
    /// Parse a selector byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StreamKind::Stdin),
            1 => Some(StreamKind::Stdout),
            2 => Some(StreamKind::Stderr),
            _ => None,
        }
    }

    /// Get the selector byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdin => write!(f, "stdin"),
            StreamKind::Stdout => write!(f, "stdout"),
            StreamKind::Stderr => write!(f, "stderr"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(StreamKind::from_u8(0), Some(StreamKind::Stdin));
        assert_eq!(StreamKind::from_u8(1), Some(StreamKind::Stdout));
        assert_eq!(StreamKind::from_u8(2), Some(StreamKind::Stderr));
        assert_eq!(StreamKind::Stderr.as_u8(), 2);
    }

    #[test]
    fn test_unknown_selectors() {
        assert_eq!(StreamKind::from_u8(3), None);
        assert_eq!(StreamKind::from_u8(0xFF), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", StreamKind::Stdout), "stdout");
        assert_eq!(format!("{}", StreamKind::Stderr), "stderr");
    }
}
