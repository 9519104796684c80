mod gesture;
mod shortcut;

pub use gesture::{GestureMachine, GestureState, PointerDown, PointerLeavePolicy, PointerMove};
pub use shortcut::{
    resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
