use std::collections::VecDeque;

// A job as read off the card deck, before it has any memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: u32,
    pub ttl: u32, // Total time limit (cycles)
    pub tll: u32, // Total line limit
    pub program: Vec<String>,
    pub data: VecDeque<String>,
}

impl Job {
    pub fn new(pid: u32, ttl: u32, tll: u32) -> Self {
        Job {
            pid,
            ttl,
            tll,
            program: vec![],
            data: VecDeque::new(),
        }
    }

    pub fn with_program<I, S>(mut self, program: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data<I, S>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data = data.into_iter().map(Into::into).collect();
        self
    }
}
