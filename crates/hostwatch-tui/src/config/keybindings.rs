use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, Tab};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    ProcessList,
    LogList,
}

impl From<Tab> for KeyContext {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Processes => Self::ProcessList,
            Tab::Logs => Self::LogList,
        }
    }
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::shift(KeyCode::Char('Q')), Action::Quit);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Char('h')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::CloseOverlay);
        global.insert(KeyBinding::new(KeyCode::Tab), Action::NextTab);
        global.insert(KeyBinding::new(KeyCode::Char('1')), Action::ShowTab(Tab::Processes));
        global.insert(KeyBinding::new(KeyCode::Char('2')), Action::ShowTab(Tab::Logs));
        global.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleDetails);
        insert_navigation(&mut global);
        bindings.insert(KeyContext::Global, global);

        // Process table
        let mut processes = HashMap::new();
        processes.insert(KeyBinding::new(KeyCode::Char('c')), Action::SortByCpu);
        processes.insert(KeyBinding::new(KeyCode::Char('m')), Action::SortByMemory);
        processes.insert(KeyBinding::new(KeyCode::Char('r')), Action::ToggleSortOrder);
        processes.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleSuspiciousOnly);
        processes.insert(KeyBinding::new(KeyCode::Char('p')), Action::ToggleDetails);
        processes.insert(KeyBinding::new(KeyCode::F(5)), Action::RefreshProcesses);
        bindings.insert(KeyContext::ProcessList, processes);

        // Log list
        let mut logs = HashMap::new();
        logs.insert(KeyBinding::new(KeyCode::Char('r')), Action::RescanLogs);
        logs.insert(KeyBinding::new(KeyCode::F(5)), Action::RescanLogs);
        logs.insert(KeyBinding::shift(KeyCode::Char('F')), Action::FullRescanLogs);
        logs.insert(KeyBinding::new(KeyCode::Char('f')), Action::CycleLogFilter);
        logs.insert(KeyBinding::new(KeyCode::Char('d')), Action::ClearSeenLogs);
        logs.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleStats);
        bindings.insert(KeyContext::LogList, logs);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// While the help overlay is open, any key other than quit closes it
    pub fn get_help_action(&self, key: &KeyEvent) -> Action {
        match self.get_action(KeyContext::Global, key) {
            Some(Action::Quit) => Action::Quit,
            _ => Action::ToggleHelp,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

/// less-like list movement shared by both tabs
fn insert_navigation(map: &mut HashMap<KeyBinding, Action>) {
    map.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
    map.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
    map.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
    map.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
    map.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
    map.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
    map.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
    map.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
    map.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
    map.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
    map.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
    map.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shifted(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
    }

    #[test]
    fn test_r_depends_on_tab() {
        let kb = KeyBindings::new();
        let r = key(KeyCode::Char('r'));
        assert_eq!(
            kb.get_action(KeyContext::ProcessList, &r),
            Some(Action::ToggleSortOrder)
        );
        assert_eq!(kb.get_action(KeyContext::LogList, &r), Some(Action::RescanLogs));
    }

    #[test]
    fn test_shift_f_is_full_rescan() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogList, &shifted('F')),
            Some(Action::FullRescanLogs)
        );
        assert_eq!(
            kb.get_action(KeyContext::LogList, &key(KeyCode::Char('f'))),
            Some(Action::CycleLogFilter)
        );
    }

    #[test]
    fn test_global_fallback() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogList, &key(KeyCode::Tab)),
            Some(Action::NextTab)
        );
        assert_eq!(
            kb.get_action(KeyContext::ProcessList, &key(KeyCode::Down)),
            Some(Action::ScrollDown(1))
        );
        assert_eq!(
            kb.get_action(
                KeyContext::ProcessList,
                &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            Some(Action::Quit)
        );
        assert_eq!(kb.get_action(KeyContext::LogList, &key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let kb = KeyBindings::new();
        assert_eq!(kb.get_help_action(&key(KeyCode::Char('x'))), Action::ToggleHelp);
        assert_eq!(kb.get_help_action(&key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_context_from_tab() {
        assert_eq!(KeyContext::from(Tab::Processes), KeyContext::ProcessList);
        assert_eq!(KeyContext::from(Tab::Logs), KeyContext::LogList);
    }
}
