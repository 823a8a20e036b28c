//! league-core: League lifecycle state machine shared by the client and the browser bindings
//!
//! Everything in this crate is synchronous and free of I/O. Callers feed it the
//! latest snapshot read from the escrow contract and render whatever it derives.

pub mod amount;
pub mod countdown;
pub mod display;
pub mod errors;
pub mod forms;
pub mod gate;
pub mod lifecycle;
pub mod pot;
pub mod types;
pub mod validation;

pub use amount::*;
pub use countdown::*;
pub use display::*;
pub use errors::*;
pub use forms::*;
pub use gate::*;
pub use lifecycle::*;
pub use pot::*;
pub use types::*;
pub use validation::*;
