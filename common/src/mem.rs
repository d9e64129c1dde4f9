use crate::constants::WORD_SIZE;

use bytemuck::cast_slice;

pub type Word = [u8; WORD_SIZE];

pub const BLANK_WORD: Word = [0; WORD_SIZE];

pub fn as_byte_slice(input: &[Word]) -> &[u8] {
    cast_slice(input)
}

// Pads with spaces, truncating anything past WORD_SIZE.
pub fn to_word(input: &[u8]) -> Word {
    let mut word = [b' '; WORD_SIZE];
    for (dst, src) in word.iter_mut().zip(input) {
        *dst = *src;
    }
    word
}

pub fn str_to_word(input: &str) -> Word {
    to_word(input.as_bytes())
}

// Drops NULs, keeping everything else (including padding).
pub fn word_to_string(word: &Word) -> String {
    let bytes: Vec<u8> = word.iter().copied().filter(|b| *b != 0).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn is_blank(word: &Word) -> bool {
    word.iter().all(|b| *b == 0)
}
