//! The region capability shared by header and code regions.

use std::fmt;

use crate::core::disassembler::InstructionDecoder;
use crate::core::text_line::TextLine;
use crate::core::Rva;
use crate::navigator::code::{CodeLines, CodeRegion};
use crate::navigator::header::{HeaderLines, HeaderRegion};

/// A contiguous, inclusive RVA span with its own navigation cursor.
///
/// `position` is the last instruction boundary known to be valid and stays
/// within `[start, end]` outside of a cross-region transition.
pub trait Navigable {
    /// Lazy line sequence produced by `get_lines`.
    type Lines<'a>: Iterator<Item = TextLine>
    where
        Self: 'a;

    fn start(&self) -> Rva;

    fn end(&self) -> Rva;

    fn position(&self) -> Rva;

    fn set_position(&mut self, rva: Rva);

    /// Move the cursor back by `count` lines and return it.
    fn step_up(&mut self, count: u32) -> Rva;

    /// Move the cursor forward by `count` lines and return it.
    fn step_down(&mut self, count: u32) -> Rva;

    /// Jump to the line at or immediately before `new_offset` and return it.
    fn seek_vertical(&mut self, new_offset: Rva) -> Rva;

    /// Materialize at most `end_rva - start_rva` lines starting at `start_rva`.
    /// Does not move the cursor.
    fn get_lines(&self, start_rva: Rva, end_rva: Rva) -> Self::Lines<'_>;

    fn contains(&self, rva: Rva) -> bool {
        rva >= self.start() && rva <= self.end()
    }

    /// Forget the cursor, putting it back at the region start.
    fn reset(&mut self) {
        let start = self.start();
        self.set_position(start);
    }
}

/// The closed set of region kinds a navigator is built from.
pub enum Region<D: InstructionDecoder> {
    Header(HeaderRegion),
    Code(CodeRegion<D>),
}

impl<D: InstructionDecoder> Region<D> {
    /// Section name, or `"header"`.
    pub fn name(&self) -> &str {
        match self {
            Region::Header(_) => "header",
            Region::Code(r) => r.name(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Region::Code(_))
    }
}

/// Lines of either region kind.
pub enum Lines<'a, D: InstructionDecoder> {
    Header(HeaderLines),
    Code(CodeLines<'a, D>),
}

impl<D: InstructionDecoder> Iterator for Lines<'_, D> {
    type Item = TextLine;

    fn next(&mut self) -> Option<TextLine> {
        match self {
            Lines::Header(l) => l.next(),
            Lines::Code(l) => l.next(),
        }
    }
}

impl<D: InstructionDecoder> Navigable for Region<D> {
    type Lines<'a>
        = Lines<'a, D>
    where
        Self: 'a;

    fn start(&self) -> Rva {
        match self {
            Region::Header(r) => r.start(),
            Region::Code(r) => r.start(),
        }
    }

    fn end(&self) -> Rva {
        match self {
            Region::Header(r) => r.end(),
            Region::Code(r) => r.end(),
        }
    }

    fn position(&self) -> Rva {
        match self {
            Region::Header(r) => r.position(),
            Region::Code(r) => r.position(),
        }
    }

    fn set_position(&mut self, rva: Rva) {
        match self {
            Region::Header(r) => r.set_position(rva),
            Region::Code(r) => r.set_position(rva),
        }
    }

    fn step_up(&mut self, count: u32) -> Rva {
        match self {
            Region::Header(r) => r.step_up(count),
            Region::Code(r) => r.step_up(count),
        }
    }

    fn step_down(&mut self, count: u32) -> Rva {
        match self {
            Region::Header(r) => r.step_down(count),
            Region::Code(r) => r.step_down(count),
        }
    }

    fn seek_vertical(&mut self, new_offset: Rva) -> Rva {
        match self {
            Region::Header(r) => r.seek_vertical(new_offset),
            Region::Code(r) => r.seek_vertical(new_offset),
        }
    }

    fn get_lines(&self, start_rva: Rva, end_rva: Rva) -> Lines<'_, D> {
        match self {
            Region::Header(r) => Lines::Header(r.get_lines(start_rva, end_rva)),
            Region::Code(r) => Lines::Code(r.get_lines(start_rva, end_rva)),
        }
    }
}

impl<D: InstructionDecoder> fmt::Display for Region<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:X} - {:X})", self.name(), self.start(), self.end())
    }
}

impl<D: InstructionDecoder> fmt::Debug for Region<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name())
            .field("start", &format_args!("{:#x}", self.start()))
            .field("end", &format_args!("{:#x}", self.end()))
            .field("position", &format_args!("{:#x}", self.position()))
            .finish()
    }
}
