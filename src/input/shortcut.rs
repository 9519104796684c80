use serde::{Deserialize, Serialize};

use crate::editor::tools::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutKey {
    Character(char),
    Escape,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub gesture_active: bool,
    pub has_image: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    ClearAll,
    Export,
    CancelGesture,
    SelectTool(ToolKind),
    ZoomIn,
    ZoomOut,
    ActualSize,
}

fn resolve_tool_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    let tool = match key {
        ShortcutKey::Character('v') => ToolKind::Select,
        ShortcutKey::Character('p') => ToolKind::Pen,
        ShortcutKey::Character('h') => ToolKind::Highlighter,
        ShortcutKey::Character('r') => ToolKind::Rectangle,
        ShortcutKey::Character('o') => ToolKind::Circle,
        ShortcutKey::Character('t') => ToolKind::Text,
        ShortcutKey::Character('e') => ToolKind::Eraser,
        ShortcutKey::Character('m') => ToolKind::Move,
        _ => return None,
    };
    Some(ShortcutAction::SelectTool(tool))
}

fn resolve_gesture_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    match key {
        ShortcutKey::Escape => Some(ShortcutAction::CancelGesture),
        _ => None,
    }
}

fn resolve_editor_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    match (key, modifiers.ctrl, modifiers.shift) {
        (ShortcutKey::Character('z'), true, false) => Some(ShortcutAction::Undo),
        (ShortcutKey::Character('z'), true, true) | (ShortcutKey::Character('y'), true, _) => {
            Some(ShortcutAction::Redo)
        }
        (ShortcutKey::Character('s'), true, _) if context.has_image => {
            Some(ShortcutAction::Export)
        }
        (ShortcutKey::Delete, true, _) => Some(ShortcutAction::ClearAll),
        (ShortcutKey::Character('+'), _, _) | (ShortcutKey::Character('='), true, _) => {
            Some(ShortcutAction::ZoomIn)
        }
        (ShortcutKey::Character('-'), _, _) => Some(ShortcutAction::ZoomOut),
        (ShortcutKey::Character('0'), true, _) => Some(ShortcutAction::ActualSize),
        (_, false, false) => resolve_tool_shortcut(key),
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.gesture_active {
        return resolve_gesture_shortcut(key);
    }

    resolve_editor_shortcut(key, modifiers, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_context() -> InputContext {
        InputContext {
            has_image: true,
            ..Default::default()
        }
    }

    #[test]
    fn resolve_shortcut_only_allows_cancel_during_gesture() {
        let context = InputContext {
            gesture_active: true,
            has_image: true,
        };
        assert_eq!(
            resolve_shortcut(ShortcutKey::Escape, ShortcutModifiers::default(), context),
            Some(ShortcutAction::CancelGesture)
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('z'),
                ShortcutModifiers::new(true, false),
                context
            ),
            None
        );
    }

    #[test]
    fn resolve_shortcut_maps_history_shortcuts() {
        let context = editor_context();
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('z'),
                ShortcutModifiers::new(true, false),
                context
            ),
            Some(ShortcutAction::Undo)
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('z'),
                ShortcutModifiers::new(true, true),
                context
            ),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('y'),
                ShortcutModifiers::new(true, false),
                context
            ),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Delete, ShortcutModifiers::new(true, false), context),
            Some(ShortcutAction::ClearAll)
        );
    }

    #[test]
    fn resolve_shortcut_maps_tool_letters() {
        let context = editor_context();
        let cases = [
            ('v', ToolKind::Select),
            ('p', ToolKind::Pen),
            ('h', ToolKind::Highlighter),
            ('r', ToolKind::Rectangle),
            ('o', ToolKind::Circle),
            ('t', ToolKind::Text),
            ('e', ToolKind::Eraser),
            ('m', ToolKind::Move),
        ];
        for (key, tool) in cases {
            assert_eq!(
                resolve_shortcut(
                    ShortcutKey::Character(key),
                    ShortcutModifiers::default(),
                    context
                ),
                Some(ShortcutAction::SelectTool(tool)),
                "{key}"
            );
        }
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('p'),
                ShortcutModifiers::new(true, false),
                context
            ),
            None
        );
    }

    #[test]
    fn resolve_shortcut_export_requires_image() {
        let key = ShortcutKey::Character('s');
        let ctrl = ShortcutModifiers::new(true, false);
        assert_eq!(
            resolve_shortcut(key, ctrl, editor_context()),
            Some(ShortcutAction::Export)
        );
        assert_eq!(resolve_shortcut(key, ctrl, InputContext::default()), None);
    }

    #[test]
    fn resolve_shortcut_maps_zoom_keys() {
        let context = editor_context();
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('+'),
                ShortcutModifiers::new(false, true),
                context
            ),
            Some(ShortcutAction::ZoomIn)
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('-'),
                ShortcutModifiers::default(),
                context
            ),
            Some(ShortcutAction::ZoomOut)
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('0'),
                ShortcutModifiers::new(true, false),
                context
            ),
            Some(ShortcutAction::ActualSize)
        );
    }
}
