//! Line-oriented navigation over a loaded image.
//!
//! The image's RVA space `[0, size_of_image]` is partitioned into contiguous
//! regions: the header pseudo-region followed by one decoding region per
//! section. [`Navigator`] owns the region table and a current index, and
//! turns line-granular requests (step up, step down, seek, read a window of
//! lines) into per-region operations, moving between regions when one runs
//! out.

pub mod code;
pub mod header;
pub mod region;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{NavigatorConfig, SearchConfig};
use crate::core::disassembler::InstructionDecoder;
use crate::core::layout::ImageLayout;
use crate::core::text_line::TextLine;
use crate::core::Rva;
use crate::error::{NavError, Result};
use crate::span_trace;

pub use self::code::{CodeLines, CodeRegion};
pub use self::header::{HeaderLines, HeaderRegion};
pub use self::region::{Lines, Navigable, Region};

/// Cursor over the whole image, one region active at a time.
pub struct Navigator<D: InstructionDecoder> {
    regions: Vec<Region<D>>,
    current: usize,
    search: SearchConfig,
}

impl<D: InstructionDecoder> Navigator<D> {
    /// Build the region table for `layout` with default settings.
    ///
    /// `decoder` must take absolute addresses based at `layout.image_base`.
    pub fn new(layout: &ImageLayout, decoder: Arc<D>) -> Result<Self> {
        Self::with_config(layout, decoder, &NavigatorConfig::default())
    }

    /// Build the region table for `layout`.
    ///
    /// Region 0 is the header `[0, first_section_rva - 1]`. Each section then
    /// gets a decoding region ending one byte before the next section, and
    /// the last one ends at `size_of_image`.
    pub fn with_config(
        layout: &ImageLayout,
        decoder: Arc<D>,
        config: &NavigatorConfig,
    ) -> Result<Self> {
        config.validate()?;
        layout.validate()?;

        let size_of_image = layout.size_of_image as Rva;
        let header_end = layout
            .first_section_rva()
            .map(|rva| rva as Rva - 1)
            .unwrap_or(size_of_image);

        let mut regions = Vec::with_capacity(layout.sections.len() + 1);
        regions.push(Region::Header(HeaderRegion::new(0, header_end)));

        for (i, section) in layout.sections.iter().enumerate() {
            let start = section.virtual_address as Rva;
            let end = layout
                .sections
                .get(i + 1)
                .map(|next| next.virtual_address as Rva - 1)
                .unwrap_or(size_of_image);

            let region = CodeRegion::new(
                section.name.clone(),
                start,
                end,
                layout.image_base,
                Arc::clone(&decoder),
            )
            .with_search(config.search)
            .with_format(config.format);
            regions.push(Region::Code(region));
        }

        let nav = Self::from_regions(regions, config.search)?;
        debug!(regions = nav.regions.len(), "navigator ready");
        Ok(nav)
    }

    /// Use an explicit region table. Regions must be non-empty, ordered and
    /// contiguous.
    pub fn from_regions(regions: Vec<Region<D>>, search: SearchConfig) -> Result<Self> {
        search.validate()?;
        if regions.is_empty() {
            return Err(NavError::InvalidInput("no regions".to_string()));
        }
        for r in &regions {
            if r.start() > r.end() {
                return Err(NavError::InvalidInput(format!("region {} is empty", r)));
            }
        }
        for pair in regions.windows(2) {
            if pair[0].end() + 1 != pair[1].start() {
                return Err(NavError::InvalidInput(format!(
                    "regions {} and {} are not contiguous",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self {
            regions,
            current: 0,
            search,
        })
    }

    pub fn regions(&self) -> &[Region<D>] {
        &self.regions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Region<D> {
        &self.regions[self.current]
    }

    /// Cursor of the current region.
    pub fn position(&self) -> Rva {
        self.current().position()
    }

    /// Last RVA of the navigable space.
    pub fn size_of_image(&self) -> Rva {
        self.last().end()
    }

    /// Index of the region containing `rva`, if any.
    pub fn region_index_of(&self, rva: Rva) -> Option<usize> {
        let idx = self.regions.partition_point(|r| r.start() <= rva);
        let idx = idx.checked_sub(1)?;
        self.regions[idx].contains(rva).then_some(idx)
    }

    fn last(&self) -> &Region<D> {
        &self.regions[self.regions.len() - 1]
    }

    /// Move the cursor `|count|` lines up, crossing into earlier regions as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::UnresolvedRegionEnd`] when the move would enter a
    /// decoding region from below; the cursor stays at the start of the
    /// current region.
    ///
    /// # Panics
    ///
    /// Panics if a fast-path move lands at or before the region start.
    pub fn step_up(&mut self, count: i32) -> Result<Rva> {
        let count = count.unsigned_abs();
        let _span = span_trace!("step_up", count, region = self.current).entered();

        let margin = count as Rva * self.search.max_instruction_len;
        let region = &mut self.regions[self.current];
        if region.position() - margin > region.start() {
            let result = region.step_up(count);
            assert!(
                result > region.start(),
                "step up landed at {:#x}, not after start of {}",
                result,
                region
            );
            return Ok(result);
        }

        let mut result = region.position();
        for _ in 0..count {
            let initial = self.regions[self.current].position();
            result = self.regions[self.current].step_up(1);

            if initial == result && self.current > 0 {
                let previous = &self.regions[self.current - 1];
                if let Region::Code(code) = previous {
                    warn!(region = %previous, "refusing to step into the end of a code region");
                    return Err(NavError::UnresolvedRegionEnd {
                        region: code.name().to_string(),
                        start: code.start(),
                        end: code.end(),
                    });
                }

                self.current -= 1;
                let region = &mut self.regions[self.current];
                let end = region.end();
                region.set_position(end);
                debug!(region = %region, "stepped up into previous region");
                result = end;
            }
        }
        Ok(result)
    }

    /// Move the cursor `|count|` lines down, crossing into later regions as
    /// needed. At the last line of the image this is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if a fast-path move lands at or after the region end.
    pub fn step_down(&mut self, count: i32) -> Rva {
        let count = count.unsigned_abs();
        let _span = span_trace!("step_down", count, region = self.current).entered();

        let margin = count as Rva * self.search.max_instruction_len;
        let region = &mut self.regions[self.current];
        if region.position() + margin < region.end() {
            let result = region.step_down(count);
            assert!(
                result < region.end(),
                "step down landed at {:#x}, not before end of {}",
                result,
                region
            );
            return result;
        }

        let mut result = region.position();
        for _ in 0..count {
            let initial = self.regions[self.current].position();
            result = self.regions[self.current].step_down(1);

            if initial == result && self.current + 1 < self.regions.len() {
                self.current += 1;
                let region = &self.regions[self.current];
                debug!(region = %region, "stepped down into next region");
                result = region.position();
            }
        }
        result
    }

    /// Jump to the line at or immediately before `new_offset`.
    ///
    /// Offsets below the image are clamped to its start. Offsets past the
    /// image are clamped to its last byte, or to `size_of_image` itself when
    /// the image ends in the header, whose every RVA is a line. Regions left
    /// behind get their cursors reset to their start.
    pub fn seek_vertical(&mut self, new_offset: Rva) -> Rva {
        let _span = span_trace!("seek_vertical", new_offset).entered();
        let first = self.regions[0].start();
        let last = if self.last().is_code() {
            (self.size_of_image() - 1).max(first)
        } else {
            self.size_of_image()
        };
        let new_offset = new_offset.clamp(first, last);

        if new_offset > self.current().start() {
            while new_offset > self.current().end() {
                self.current += 1;
            }
            let result = self.regions[self.current].seek_vertical(new_offset);
            for region in &mut self.regions[..self.current] {
                region.reset();
            }
            debug!(region = self.current, position = format_args!("{:#x}", result), "seek");
            result
        } else {
            while new_offset < self.current().start() {
                self.current -= 1;
            }
            let result = self.regions[self.current].seek_vertical(new_offset);
            for region in &mut self.regions[self.current + 1..] {
                region.reset();
            }
            debug!(region = self.current, position = format_args!("{:#x}", result), "seek");
            result
        }
    }

    /// Lines covering `[start_rva, end_rva)`, at most `end_rva - start_rva`
    /// of them, in ascending RVA order. Cursors are not moved.
    pub fn get_lines(&self, start_rva: Rva, end_rva: Rva) -> Vec<TextLine> {
        let max = (end_rva - start_rva).max(0) as usize;
        let mut lines = Vec::with_capacity(max.min(1024));

        for region in &self.regions {
            if lines.len() >= max {
                break;
            }
            let start = region.start().max(start_rva);
            let end = region.end().min(end_rva);

            let mut count = end - start;
            // The region end is inclusive
            if end == region.end() {
                count += 1;
            }
            if count > 0 {
                let room = max - lines.len();
                lines.extend(region.get_lines(start, start + count).take(room));
            }
        }
        lines
    }
}
