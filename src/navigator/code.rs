//! Decoding regions: one per image section, navigated by instruction.
//!
//! Forward movement is exact: decode from the cursor and land on the end of
//! the last instruction. Backward movement cannot be exact on a
//! variable-length instruction set, so it goes through
//! [`CodeRegion::find_previous_boundary`], which decodes forward from a window
//! below the target and trusts that the instruction stream resynchronizes
//! before reaching it.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{FormatConfig, SearchConfig};
use crate::core::disassembler::InstructionDecoder;
use crate::core::text_line::TextLine;
use crate::core::Rva;
use crate::navigator::region::Navigable;

/// RVA span of one section, decoded on demand.
pub struct CodeRegion<D: InstructionDecoder> {
    name: String,
    start: Rva,
    end: Rva,
    position: Rva,
    module_base: u64,
    decoder: Arc<D>,
    search: SearchConfig,
    format: FormatConfig,
}

impl<D: InstructionDecoder> CodeRegion<D> {
    /// Region over `[start, end]`, cursor at `start`.
    ///
    /// `decoder` takes absolute addresses; `module_base` is added to every
    /// RVA before it is handed over.
    pub fn new(
        name: impl Into<String>,
        start: Rva,
        end: Rva,
        module_base: u64,
        decoder: Arc<D>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            position: start,
            module_base,
            decoder,
            search: SearchConfig::default(),
            format: FormatConfig::default(),
        }
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_format(mut self, format: FormatConfig) -> Self {
        self.format = format;
        self
    }

    /// Section name this region was built from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    fn address_of(&self, rva: Rva) -> u64 {
        self.module_base.wrapping_add(rva as u64)
    }

    fn rva_of(&self, address: u64) -> Rva {
        address.wrapping_sub(self.module_base) as Rva
    }

    /// Locate an instruction boundary at or before `anchor + guess_offset`,
    /// `count` lines back.
    ///
    /// Decoding starts `max_instruction_len * (count + window_margin)` bytes
    /// below the target (never below the region start). Undecodable bytes are
    /// skipped `resync_skip` at a time. The result is always within
    /// `[start, anchor + guess_offset]`, or the window start when the target
    /// lies below it.
    pub fn find_previous_boundary(&self, anchor: Rva, guess_offset: Rva, count: u32) -> Rva {
        let count = count as Rva;
        let target = anchor + guess_offset;
        let window = self.search.max_instruction_len * (count + self.search.window_margin);
        let window_start = (target - window).max(self.start);

        if target < window_start {
            return window_start;
        }

        let search_range = target - window_start;
        let skip = self.search.resync_skip.max(1);

        trace!(
            region = %self.name,
            window_start = format_args!("{:#x}", window_start),
            target = format_args!("{:#x}", target),
            count,
            "reverse search window"
        );

        // (rva, length) of every instruction decoded in the window
        let mut decoded: Vec<(Rva, Rva)> = Vec::new();
        let mut offset = 0;
        while offset <= search_range {
            let rva = window_start + offset;
            match self.decoder.decode_one(self.address_of(rva)) {
                Some(instr) => {
                    let len = (instr.len() as Rva).max(1);
                    decoded.push((rva, len));
                    offset += len;
                }
                None => offset += skip,
            }
        }

        match decoded.len() {
            0 => return window_start,
            1 => return decoded[0].0,
            _ => {}
        }

        let pivot = if count == 1 {
            decoded[decoded.len() - 1]
        } else {
            let idx = decoded.len() as Rva - count - 1;
            if idx < 0 {
                // Fewer lines in the window than requested
                return decoded[0].0;
            }
            decoded[idx as usize]
        };

        let candidate_end = pivot.0 + pivot.1;
        if candidate_end > target {
            pivot.0
        } else {
            candidate_end
        }
    }
}

/// Lazily decoded lines of a code region.
///
/// Stops at the first undecodable address, at the first instruction that
/// starts beyond the region end, or after the requested number of lines.
pub struct CodeLines<'a, D: InstructionDecoder> {
    region: &'a CodeRegion<D>,
    ip: Rva,
    skip_below: Rva,
    remaining: usize,
}

impl<D: InstructionDecoder> Iterator for CodeLines<'_, D> {
    type Item = TextLine;

    fn next(&mut self) -> Option<TextLine> {
        while self.remaining > 0 && self.ip <= self.region.end {
            let Some(instr) = self.region.decoder.decode_one(self.region.address_of(self.ip)) else {
                self.remaining = 0;
                return None;
            };
            let rva = self.ip;
            self.ip += (instr.len() as Rva).max(1);
            if rva < self.skip_below {
                continue;
            }
            self.remaining -= 1;
            return Some(TextLine::from_instruction(
                &instr,
                self.region.module_base,
                self.region.decoder.address_bits(),
                &self.region.format,
            ));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<D: InstructionDecoder> Navigable for CodeRegion<D> {
    type Lines<'a>
        = CodeLines<'a, D>
    where
        Self: 'a;

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

    /// Reverse search anchored on the last byte before the cursor.
    fn step_up(&mut self, count: u32) -> Rva {
        if count == 0 {
            return self.position;
        }
        self.position = self.find_previous_boundary(self.position - 1, 0, count);
        self.position
    }

    /// Move `count` instructions forward, landing on the start of an
    /// instruction that decodes. Instructions starting past the region end
    /// are not taken, and neither is the end of the last decodable
    /// instruction, so a region that cannot move reports no movement.
    fn step_down(&mut self, count: u32) -> Rva {
        if count == 0 {
            return self.position;
        }
        let decoded = self.decoder.decode_n(
            self.address_of(self.position),
            (count as usize).saturating_add(1),
        );
        let end = self.end;
        let landed = decoded
            .iter()
            .skip(1)
            .map(|i| self.rva_of(i.address))
            .take_while(|&next| next <= end)
            .last();
        if let Some(next) = landed {
            self.position = next;
        }
        self.position
    }

    /// Settle on the boundary at or before `new_offset`. A boundary that is
    /// only the end of the last decodable instruction is not a line, so the
    /// cursor backs up onto that instruction instead.
    fn seek_vertical(&mut self, new_offset: Rva) -> Rva {
        let target = new_offset.clamp(self.start, self.end);
        let diff = target - self.position;
        let mut landed = self.find_previous_boundary(self.position, diff, 1);
        if landed > self.start && self.decoder.decode_one(self.address_of(landed)).is_none() {
            landed = self.find_previous_boundary(landed - 1, 0, 1);
        }
        self.position = landed;
        debug!(
            region = %self.name,
            requested = format_args!("{:#x}", new_offset),
            position = format_args!("{:#x}", self.position),
            "seek"
        );
        self.position
    }

    fn get_lines(&self, start_rva: Rva, end_rva: Rva) -> CodeLines<'_, D> {
        let remaining = (end_rva - start_rva).max(0) as usize;

        if start_rva < self.position {
            // Back up to a boundary at or before start_rva; lines begin there.
            let from = self.find_previous_boundary(self.position, start_rva - self.position, 1);
            CodeLines {
                region: self,
                ip: from,
                skip_below: from,
                remaining,
            }
        } else {
            CodeLines {
                region: self,
                ip: self.position,
                skip_below: start_rva,
                remaining,
            }
        }
    }
}
