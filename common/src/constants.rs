pub const WORD_SIZE: usize = 4; // Bytes
pub const PAGE_SIZE: usize = 10; // Words
pub const FRAME_COUNT: usize = 10;
pub const MEM_SIZE: usize = FRAME_COUNT * PAGE_SIZE; // Words

// Program cards are packed this many to a page when loaded.
pub const INS_PER_PAGE: usize = PAGE_SIZE / WORD_SIZE;

pub const MAX_CYCLES: u64 = 1_000_000;
pub const TIME_SLICE: u64 = 10; // Cycles
pub const NUM_INTERRUPTS: usize = 8;
