use common::constants::*;
use common::mem::{BLANK_WORD, Word, as_byte_slice, is_blank, word_to_string};

use std::fmt::Write;

use log::trace;

// Word-addressed physical memory, carved into FRAME_COUNT frames of PAGE_SIZE
// words. A frame is handed to at most one owner at a time.
pub struct Memory {
    data: Vec<Word>,
    allocated: [bool; FRAME_COUNT],
    locked: [bool; FRAME_COUNT],
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            data: vec![BLANK_WORD; MEM_SIZE],
            allocated: [false; FRAME_COUNT],
            locked: [false; FRAME_COUNT],
        }
    }

    pub fn read_word(&self, addr: usize) -> Word {
        self.data[addr]
    }

    pub fn write_word(&mut self, addr: usize, val: Word) {
        trace!("Mem: writing {:?} to {addr}", word_to_string(&val));
        self.data[addr] = val;
    }

    // First fit.
    pub fn allocate_frame(&mut self) -> Option<usize> {
        let frame = self.allocated.iter().position(|taken| !taken)?;
        self.allocated[frame] = true;
        trace!("Mem: allocated frame {frame}");
        Some(frame)
    }

    pub fn release_frame(&mut self, frame: usize) {
        assert!(frame < FRAME_COUNT, "Frame {frame} out of range");
        trace!("Mem: releasing frame {frame}");
        self.allocated[frame] = false;
        self.clear_frame(frame);
        self.unlock_frame(frame);
    }

    pub fn clear_frame(&mut self, frame: usize) {
        let start = frame * PAGE_SIZE;
        self.data[start..start + PAGE_SIZE].fill(BLANK_WORD);
    }

    pub fn lock_frame(&mut self, frame: usize) {
        self.locked[frame] = true;
    }

    pub fn unlock_frame(&mut self, frame: usize) {
        self.locked[frame] = false;
    }

    pub fn is_allocated(&self, frame: usize) -> bool {
        self.allocated[frame]
    }

    pub fn is_locked(&self, frame: usize) -> bool {
        self.locked[frame]
    }

    pub fn free_frames(&self) -> usize {
        self.allocated.iter().filter(|taken| !**taken).count()
    }

    pub fn frame(&self, frame: usize) -> &[Word] {
        let start = frame * PAGE_SIZE;
        &self.data[start..start + PAGE_SIZE]
    }

    pub fn frame_bytes(&self, frame: usize) -> &[u8] {
        as_byte_slice(self.frame(frame))
    }

    pub fn is_frame_zeroed(&self, frame: usize) -> bool {
        self.frame_bytes(frame).iter().all(|b| *b == 0)
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        for frame in 0..FRAME_COUNT {
            let alloc = if self.allocated[frame] { "allocated" } else { "free" };
            let lock = if self.locked[frame] { ", locked" } else { "" };
            // Writing to a String can't fail.
            let _ = writeln!(out, "frame {frame}: {alloc}{lock}");
            for (offset, word) in self.frame(frame).iter().enumerate() {
                if !is_blank(word) {
                    let _ = writeln!(out, "  {:3}: {:?}", frame * PAGE_SIZE + offset, word_to_string(word));
                }
            }
        }
        out
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
