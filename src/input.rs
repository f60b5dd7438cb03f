//! Input handling and Vim-like keybindings

use iced::keyboard::Key;
use iced::keyboard::key::Named;

/// Vim-like input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode - for navigation
    Normal,
    /// Command mode - for entering commands with `:` prefix
    Command,
}

/// Action that results from key input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Move to next page
    NextPage,
    /// Move to previous page
    PrevPage,
    /// Jump to first page
    FirstPage,
    /// Jump to last page
    LastPage,
    /// Step several pages forward (Ctrl+d in Vim)
    HalfPageDown,
    /// Step several pages backward (Ctrl+u in Vim)
    HalfPageUp,
    /// Jump to the page named by a raw 1-based entry; the navigation layer
    /// validates it
    JumpToEntry(String),
    /// Switch between single-page and continuous-scroll presentation
    ToggleViewMode,
    /// Scale pages up
    ZoomIn,
    /// Scale pages down
    ZoomOut,
    /// Enter command mode
    EnterCommandMode,
    /// Exit/quit
    Quit,
    /// No action
    None,
}

/// Key handler for Vim-like navigation
pub struct KeyHandler {
    mode: InputMode,
    command_buffer: String,
}

impl KeyHandler {
    pub fn new() -> Self {
        Self {
            mode: InputMode::Normal,
            command_buffer: String::new(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Process a key press and return the corresponding action
    pub fn handle_key(&mut self, key: &Key) -> NavigationAction {
        match self.mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Command => self.handle_command_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: &Key) -> NavigationAction {
        match key.as_ref() {
            // Next page: j, Down arrow
            Key::Character("j") | Key::Named(Named::ArrowDown) => NavigationAction::NextPage,

            // Previous page: k, Up arrow
            Key::Character("k") | Key::Named(Named::ArrowUp) => NavigationAction::PrevPage,

            // First page: gg
            Key::Character("g") => {
                if self.command_buffer == "g" {
                    self.command_buffer.clear();
                    NavigationAction::FirstPage
                } else {
                    self.command_buffer = "g".to_string();
                    NavigationAction::None
                }
            }

            // Last page: G (Shift+g)
            Key::Character("G") => NavigationAction::LastPage,

            // Several pages at a time: d / u
            Key::Character("d") => NavigationAction::HalfPageDown,
            Key::Character("u") => NavigationAction::HalfPageUp,

            // Toggle single-page / continuous-scroll: m
            Key::Character("m") => NavigationAction::ToggleViewMode,

            // Zoom: + (or =) and -
            Key::Character("+") | Key::Character("=") => NavigationAction::ZoomIn,
            Key::Character("-") => NavigationAction::ZoomOut,

            // Quit: q
            Key::Character("q") | Key::Character("Q") => NavigationAction::Quit,

            // Enter command mode: :
            Key::Character(":") => {
                self.mode = InputMode::Command;
                self.command_buffer.clear();
                NavigationAction::EnterCommandMode
            }

            // Number input for page jump
            Key::Character(c) if c.chars().all(|ch| ch.is_numeric()) => {
                self.command_buffer.push_str(c);
                NavigationAction::None
            }

            // Enter to execute number jump
            Key::Named(Named::Enter) if !self.command_buffer.is_empty() => {
                let entry = std::mem::take(&mut self.command_buffer);
                NavigationAction::JumpToEntry(entry)
            }

            // Escape to clear buffer
            Key::Named(Named::Escape) => {
                self.command_buffer.clear();
                NavigationAction::None
            }

            _ => NavigationAction::None,
        }
    }

    fn handle_command_mode(&mut self, key: &Key) -> NavigationAction {
        match key.as_ref() {
            // Execute command
            Key::Named(Named::Enter) => {
                let action = self.parse_command();
                self.mode = InputMode::Normal;
                self.command_buffer.clear();
                action
            }

            // Cancel command mode
            Key::Named(Named::Escape) => {
                self.mode = InputMode::Normal;
                self.command_buffer.clear();
                NavigationAction::None
            }

            // Backspace
            Key::Named(Named::Backspace) => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = InputMode::Normal;
                }
                NavigationAction::None
            }

            // Character input
            Key::Character(c) => {
                self.command_buffer.push_str(c);
                NavigationAction::None
            }

            _ => NavigationAction::None,
        }
    }

    fn parse_command(&self) -> NavigationAction {
        let cmd = self.command_buffer.trim();

        // :q or :quit - quit
        if cmd == "q" || cmd == "quit" {
            return NavigationAction::Quit;
        }

        // :scroll / :jump - explicit view mode is just a toggle for now
        if cmd == "mode" {
            return NavigationAction::ToggleViewMode;
        }

        // :123 - jump to page 123; validation happens downstream
        if !cmd.is_empty() {
            return NavigationAction::JumpToEntry(cmd.to_string());
        }

        NavigationAction::None
    }
}

impl Default for KeyHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(c: &str) -> Key {
        Key::Character(c.into())
    }

    #[test]
    fn j_and_k_step_between_pages() {
        let mut handler = KeyHandler::new();
        assert_eq!(handler.handle_key(&character("j")), NavigationAction::NextPage);
        assert_eq!(handler.handle_key(&character("k")), NavigationAction::PrevPage);
    }

    #[test]
    fn double_g_goes_to_the_first_page() {
        let mut handler = KeyHandler::new();
        assert_eq!(handler.handle_key(&character("g")), NavigationAction::None);
        assert_eq!(handler.handle_key(&character("g")), NavigationAction::FirstPage);
        assert_eq!(handler.handle_key(&character("G")), NavigationAction::LastPage);
    }

    #[test]
    fn number_buffer_plus_enter_jumps_by_entry() {
        let mut handler = KeyHandler::new();
        handler.handle_key(&character("1"));
        handler.handle_key(&character("2"));
        assert_eq!(handler.command_buffer(), "12");
        assert_eq!(
            handler.handle_key(&Key::Named(Named::Enter)),
            NavigationAction::JumpToEntry("12".to_string())
        );
        assert_eq!(handler.command_buffer(), "");
    }

    #[test]
    fn escape_clears_the_pending_buffer() {
        let mut handler = KeyHandler::new();
        handler.handle_key(&character("4"));
        handler.handle_key(&Key::Named(Named::Escape));
        assert_eq!(handler.command_buffer(), "");
        assert_eq!(
            handler.handle_key(&Key::Named(Named::Enter)),
            NavigationAction::None
        );
    }

    #[test]
    fn command_mode_quits_and_jumps() {
        let mut handler = KeyHandler::new();
        handler.handle_key(&character(":"));
        assert_eq!(handler.mode(), InputMode::Command);
        handler.handle_key(&character("q"));
        assert_eq!(
            handler.handle_key(&Key::Named(Named::Enter)),
            NavigationAction::Quit
        );
        assert_eq!(handler.mode(), InputMode::Normal);

        handler.handle_key(&character(":"));
        handler.handle_key(&character("7"));
        assert_eq!(
            handler.handle_key(&Key::Named(Named::Enter)),
            NavigationAction::JumpToEntry("7".to_string())
        );
    }

    #[test]
    fn command_mode_passes_bad_entries_through_for_validation() {
        let mut handler = KeyHandler::new();
        handler.handle_key(&character(":"));
        handler.handle_key(&character("a"));
        handler.handle_key(&character("b"));
        assert_eq!(
            handler.handle_key(&Key::Named(Named::Enter)),
            NavigationAction::JumpToEntry("ab".to_string())
        );
    }

    #[test]
    fn mode_and_zoom_keys_map_to_their_actions() {
        let mut handler = KeyHandler::new();
        assert_eq!(
            handler.handle_key(&character("m")),
            NavigationAction::ToggleViewMode
        );
        assert_eq!(handler.handle_key(&character("+")), NavigationAction::ZoomIn);
        assert_eq!(handler.handle_key(&character("-")), NavigationAction::ZoomOut);
    }
}
