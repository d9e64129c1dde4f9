pub mod printer;

pub use printer::{PipePrinter, Printer, StdoutPrinter, WriterPrinter};
