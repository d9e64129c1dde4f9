use crate::asm::*;
use crate::mem::Word;

use derive_more::IsVariant;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, IsVariant)]
pub enum DecodeError {
    #[error("Empty instruction")]
    Empty,

    #[error("Instruction {0:?} too short")]
    TooShort(String),

    #[error("Invalid operation code {0:?}")]
    BadOpcode(String),

    #[error("Invalid operand {operand:?} for {op}")]
    BadOperand { op: Opcode, operand: String },
}

// The first two characters are the opcode, the rest (whitespace removed) the
// operand. H is the only instruction that stands alone.
pub fn decode(word: &Word) -> Result<Ins, DecodeError> {
    let end = word
        .iter()
        .rposition(|b| *b != b' ' && *b != 0)
        .map_or(0, |idx| idx + 1);
    let text = String::from_utf8_lossy(&word[..end]);
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }

    let split = text.char_indices().nth(2).map_or(text.len(), |(idx, _)| idx);
    let (op, operand) = text.split_at(split);
    let op: String = op.chars().filter(|c| !c.is_whitespace()).collect();
    let operand: String = operand.chars().filter(|c| !c.is_whitespace()).collect();

    if op == Opcode::H.mnemonic() {
        return Ok(Ins::Halt);
    }
    if text.chars().count() < 3 {
        return Err(DecodeError::TooShort(text.into_owned()));
    }

    let Some(op) = Opcode::from_mnemonic(&op) else {
        return Err(DecodeError::BadOpcode(op));
    };
    let Ok(addr) = operand.parse::<i64>() else {
        return Err(DecodeError::BadOperand { op, operand });
    };
    Ok(Ins::from_op(op, addr))
}
