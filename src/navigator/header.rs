//! The header pseudo-region: fixed content, one line per RVA.

use std::ops::Range;

use crate::core::text_line::TextLine;
use crate::core::Rva;
use crate::navigator::region::Navigable;

/// RVA span `[0, first_section_rva - 1]` holding the image headers.
///
/// No decoding happens here; every RVA is its own line, so stepping is plain
/// arithmetic clamped to the region bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRegion {
    start: Rva,
    end: Rva,
    position: Rva,
}

impl HeaderRegion {
    pub fn new(start: Rva, end: Rva) -> Self {
        Self {
            start,
            end,
            position: start,
        }
    }
}

/// Lines of a header region.
pub struct HeaderLines {
    range: Range<Rva>,
}

impl Iterator for HeaderLines {
    type Item = TextLine;

    fn next(&mut self) -> Option<TextLine> {
        self.range.next().map(TextLine::header)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl Navigable for HeaderRegion {
    type Lines<'a> = HeaderLines;

    fn start(&self) -> Rva {
        self.start
    }

    fn end(&self) -> Rva {
        self.end
    }

    fn position(&self) -> Rva {
        self.position
    }

    fn set_position(&mut self, rva: Rva) {
        self.position = rva;
    }

    fn step_up(&mut self, count: u32) -> Rva {
        self.position = (self.position - count as Rva).max(self.start);
        self.position
    }

    fn step_down(&mut self, count: u32) -> Rva {
        self.position = (self.position + count as Rva).min(self.end);
        self.position
    }

    fn seek_vertical(&mut self, new_offset: Rva) -> Rva {
        self.position = new_offset.clamp(self.start, self.end);
        self.position
    }

    fn get_lines(&self, start_rva: Rva, end_rva: Rva) -> HeaderLines {
        HeaderLines {
            range: start_rva..end_rva,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_down_then_up() {
        let mut h = HeaderRegion::new(0, 0xfff);
        assert_eq!(h.step_down(1), 1);
        assert_eq!(h.step_down(1), 2);
        assert_eq!(h.step_down(1), 3);
        assert_eq!(h.step_up(1), 2);
    }

    #[test]
    fn step_up_clamps_to_start() {
        let mut h = HeaderRegion::new(0, 0xfff);
        assert_eq!(h.step_up(1), 0);
        h.step_down(1);
        assert_eq!(h.step_up(5), 0);
    }

    #[test]
    fn step_down_clamps_to_end() {
        let mut h = HeaderRegion::new(0, 0xfff);
        assert_eq!(h.step_down(0x2000), 0xfff);
        assert_eq!(h.step_down(1), 0xfff);
    }

    #[test]
    fn seek_clamps() {
        let mut h = HeaderRegion::new(0, 0xfff);
        assert_eq!(h.seek_vertical(20), 20);
        assert_eq!(h.seek_vertical(0x5000), 0xfff);
        assert_eq!(h.seek_vertical(-4), 0);
    }

    #[test]
    fn lines_one_per_rva() {
        let mut h = HeaderRegion::new(0, 0xfff);
        h.step_down(3);
        let lines: Vec<_> = h.get_lines(2, 30).collect();
        assert_eq!(lines.len(), 28);
        assert_eq!(lines[0].rva, 2);
        assert_eq!(lines[27].rva, 29);
        assert_eq!(lines[0].to_string(), "00000002 header");
        // Cursor unchanged
        assert_eq!(h.position(), 3);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut h = HeaderRegion::new(0, 0xfff);
        h.step_down(10);
        h.reset();
        assert_eq!(h.position(), 0);
        assert!(h.contains(0xfff));
        assert!(!h.contains(0x1000));
    }
}
