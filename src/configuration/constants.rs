pub mod cargo_env {
    pub const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");
}

pub mod common {
    /// Second SIGINT within a run exits without waiting for cancellation.
    pub const FORCED_EXIT_CODE: i32 = 130;
    pub const FAILURE_EXIT_CODE: i32 = 1;
}
