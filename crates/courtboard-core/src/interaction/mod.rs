//! Pointer gestures: dragging, drawing, long press and path creation.

mod long_press;
mod machine;
mod state;

pub use long_press::{LongPress, LongPressToken};
pub use machine::{GestureContext, InteractionMachine, PathPreview};
pub use state::InteractionState;
