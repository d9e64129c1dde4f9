pub mod emulator;
pub mod emulator_state;
pub mod interrupt;
pub mod io;
pub mod memory;
pub mod paging;
pub mod process;
pub mod scheduler;

pub use emulator::{Emulator, EngineError, ExecRet, HaltReason, RunReport};
pub use emulator_state::{CpuState, EmulatorState};
pub use io::Printer;
pub use process::{TermCode, Termination};
