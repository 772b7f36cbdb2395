//! Optional tracing integration.
//!
//! With the `tracing-integration` feature the macros here are the `tracing`
//! crate's own. Without it they expand to nothing and their arguments are not
//! evaluated, so logging costs nothing in builds that do not ask for it.
//!
//! ```ignore
//! use crate::tracing_compat::trace;
//!
//! trace!(index, bytes = n, "background read complete");
//! ```

#[cfg(feature = "tracing-integration")]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    macro_rules! trace {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }

    macro_rules! noop_warn {
        ($($arg:tt)*) => {{}};
    }

    pub(crate) use {debug, noop_warn as warn, trace};
}

#[cfg(not(feature = "tracing-integration"))]
pub(crate) use noop::{debug, trace, warn};
