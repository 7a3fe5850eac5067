use stackline_callstack::{Description, Descriptive};

pub fn frame(name: &str) -> Description {
    Description::new(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Descriptive)]
#[descriptive("request {id}")]
pub struct Request {
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Descriptive)]
pub struct Startup;
