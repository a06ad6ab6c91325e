//! Built-in strategies.
//!
//! The engine only ever sees `dyn Strategy`; these are the concrete types
//! the CLI can construct by name (see `cli::build_strategy`). Library users
//! supply their own implementations instead.

pub mod ma_cross;
pub mod buy_and_hold;

pub use buy_and_hold::BuyAndHold;
pub use ma_cross::{MaCross, MaKind};

/// Name → description, for `sbt list-strategies`.
pub const BUILTIN_STRATEGIES: &[(&str, &str)] = &[
    (
        "ema-cross",
        "buy on fast EMA crossing above slow EMA, close on the reverse cross",
    ),
    (
        "sma-cross",
        "buy on fast SMA crossing above slow SMA, close on the reverse cross",
    ),
    (
        "buy-and-hold",
        "buy as many shares as cash allows on the first bar and hold",
    ),
];
