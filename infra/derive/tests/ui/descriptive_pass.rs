use stackline_callstack::{Descriptive, NonDescriptive};

#[derive(Descriptive)]
struct Bootstrap;

#[derive(Descriptive)]
#[descriptive("load user {id} from {origin}")]
struct LoadUser {
    id: u64,
    origin: &'static str,
}

#[derive(Descriptive)]
#[descriptive("flush")]
struct Flush;

mod renamed {
    pub use stackline_callstack as frames;
}

#[derive(Descriptive)]
#[descriptive("shutdown", crate = renamed::frames)]
struct Shutdown;

#[derive(Descriptive)]
enum Phase {
    Warmup,
}

fn main() {
    assert_eq!(Bootstrap.description().as_str(), "Bootstrap");
    assert_eq!(LoadUser { id: 7, origin: "cache" }.description().as_str(), "load user 7 from cache");
    assert_eq!(Flush.description().as_str(), "flush");
    assert_eq!(Shutdown.description().as_str(), "shutdown");
    assert_eq!(Phase::Warmup.description().as_str(), "Phase");
    assert_eq!(NonDescriptive::new(3_u8).description().as_str(), "[u8] 3");
}
