use std::io::{self, Write, stdout};
use std::sync::Mutex;

// The line printer program output and termination records go to. Writes are
// synchronous; the machine never waits on the device.
pub trait Printer: Send + Sync {
    fn print(&self, line: &str) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default, Clone, Copy)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&self, line: &str) -> io::Result<()> {
        writeln!(stdout().lock(), "{line}")
    }

    fn flush(&self) -> io::Result<()> {
        stdout().lock().flush()
    }
}

pub struct WriterPrinter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterPrinter<W> {
    pub fn new(out: W) -> Self {
        WriterPrinter { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

impl<W: Write + Send> Printer for WriterPrinter<W> {
    fn print(&self, line: &str) -> io::Result<()> {
        writeln!(self.out.lock().unwrap(), "{line}")
    }

    fn flush(&self) -> io::Result<()> {
        self.out.lock().unwrap().flush()
    }
}

#[derive(Default)]
pub struct PipePrinter {
    buf: Mutex<String>,
}

impl Printer for PipePrinter {
    fn print(&self, line: &str) -> io::Result<()> {
        let mut buf = self.buf.lock().unwrap();
        buf.push_str(line);
        buf.push('\n');
        Ok(())
    }
}

impl PipePrinter {
    pub fn take(&self) -> String {
        std::mem::take(&mut self.buf.lock().unwrap())
    }

    pub fn contents(&self) -> String {
        self.buf.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().unwrap().is_empty()
    }
}
