//! Terminal UI layer for the interactive chat.
//!
//! - [`chat_loop`]: reads keys, dispatches exchanges onto background tasks,
//!   and settles their outcomes.
//! - [`view`] and [`renderer`]: UI-side state and frame composition.
//! - [`markdown`]: turns model replies into styled lines.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the conversation rules and the remote session.

pub mod chat_loop;
pub mod lifecycle;
pub mod markdown;
pub mod renderer;
pub mod view;
