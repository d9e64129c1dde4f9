use common::constants::*;

use crate::interrupt::ProgramInterrupt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    pub frame: Option<usize>,
    pub valid: bool,
}

#[derive(Debug, Clone)]
pub struct PageTable {
    entries: [PageTableEntry; FRAME_COUNT],
}

impl PageTable {
    pub fn new() -> Self {
        PageTable {
            entries: [PageTableEntry::default(); FRAME_COUNT],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, page: usize) -> Option<PageTableEntry> {
        self.entries.get(page).copied()
    }

    pub fn map(&mut self, page: usize, frame: usize) {
        assert!(frame < FRAME_COUNT, "Frame {frame} out of range");
        self.entries[page] = PageTableEntry { frame: Some(frame), valid: true };
    }

    pub fn valid_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.valid)
            .filter_map(|entry| entry.frame)
    }

    // Returns the frames that were mapped.
    pub fn invalidate_all(&mut self) -> Vec<usize> {
        let frames = self.valid_frames().collect();
        for entry in self.entries.iter_mut().filter(|entry| entry.valid) {
            entry.valid = false;
        }
        frames
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////

// Shape of the address space translation checks against. The machine only
// ever runs with STANDARD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub page_size: usize,
    pub frame_count: usize,
    pub mem_size: usize,
}

impl Geometry {
    pub const STANDARD: Geometry = Geometry {
        page_size: PAGE_SIZE,
        frame_count: FRAME_COUNT,
        mem_size: MEM_SIZE,
    };

    pub fn translate(&self, pt: &PageTable, va: i64) -> Result<usize, ProgramInterrupt> {
        let Ok(va) = usize::try_from(va) else {
            return Err(ProgramInterrupt::OperandError);
        };
        if va >= self.mem_size {
            return Err(ProgramInterrupt::OperandError);
        }

        let page = va / self.page_size;
        let offset = va % self.page_size;
        if page >= self.frame_count {
            return Err(ProgramInterrupt::PageFault);
        }

        let Some(PageTableEntry { frame: Some(frame), valid: true }) = pt.get(page) else {
            return Err(ProgramInterrupt::PageFault);
        };
        if frame >= self.frame_count {
            return Err(ProgramInterrupt::PageFault);
        }

        let ra = frame * self.page_size + offset;
        if ra >= self.mem_size {
            return Err(ProgramInterrupt::OperandError);
        }
        Ok(ra)
    }
}

pub fn translate(pt: &PageTable, va: i64) -> Result<usize, ProgramInterrupt> {
    Geometry::STANDARD.translate(pt, va)
}
