use crate::mem::{Word, str_to_word};

use std::fmt;

use derive_more::IsVariant;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    GD, // Get data
    PD, // Put data
    H,  // Halt
    LR, // Load register
    SR, // Store register
    CR, // Compare register
    BT, // Branch on true
}

impl Opcode {
    pub const ALL: [Opcode; 7] = [
        Opcode::GD,
        Opcode::PD,
        Opcode::H,
        Opcode::LR,
        Opcode::SR,
        Opcode::CR,
        Opcode::BT,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::GD => "GD",
            Opcode::PD => "PD",
            Opcode::H => "H",
            Opcode::LR => "LR",
            Opcode::SR => "SR",
            Opcode::CR => "CR",
            Opcode::BT => "BT",
        }
    }

    pub fn from_mnemonic(input: &str) -> Option<Opcode> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == input)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}


////////////////////////////////////////////////////////////////////////////////


// Operands are virtual word addresses. They're kept signed so that a card like
// "LR-1" decodes and is rejected by address translation, not the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Ins {
    Read(i64),
    Write(i64),
    Halt,
    Load(i64),
    Store(i64),
    Compare(i64),
    BranchTrue(i64),
}

impl Ins {
    pub fn op(&self) -> Opcode {
        match self {
            Ins::Read(_) => Opcode::GD,
            Ins::Write(_) => Opcode::PD,
            Ins::Halt => Opcode::H,
            Ins::Load(_) => Opcode::LR,
            Ins::Store(_) => Opcode::SR,
            Ins::Compare(_) => Opcode::CR,
            Ins::BranchTrue(_) => Opcode::BT,
        }
    }

    pub fn addr(&self) -> Option<i64> {
        match *self {
            Ins::Read(addr)
            | Ins::Write(addr)
            | Ins::Load(addr)
            | Ins::Store(addr)
            | Ins::Compare(addr)
            | Ins::BranchTrue(addr) => Some(addr),
            Ins::Halt => None,
        }
    }

    pub fn from_op(op: Opcode, addr: i64) -> Ins {
        match op {
            Opcode::GD => Ins::Read(addr),
            Opcode::PD => Ins::Write(addr),
            Opcode::H => Ins::Halt,
            Opcode::LR => Ins::Load(addr),
            Opcode::SR => Ins::Store(addr),
            Opcode::CR => Ins::Compare(addr),
            Opcode::BT => Ins::BranchTrue(addr),
        }
    }

    pub fn encode(&self) -> Word {
        str_to_word(&self.to_string())
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr() {
            Some(addr) => write!(f, "{}{addr:02}", self.op()),
            None => write!(f, "{}", self.op()),
        }
    }
}
