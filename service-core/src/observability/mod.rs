pub mod logging;

pub use logging::{build_dispatch, init_tracing};
