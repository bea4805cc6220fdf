//! Input handling and keybindings

use iced::keyboard::Key;
use iced::keyboard::key::Named;

pub const KEY_SPACE: u32 = 32;
pub const KEY_PAGE_UP: u32 = 33;
pub const KEY_PAGE_DOWN: u32 = 34;
pub const KEY_LEFT: u32 = 37;
pub const KEY_RIGHT: u32 = 39;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys navigate directly
    Normal,
    /// Keys are collected into the go-to-page prompt
    Prompt,
}

/// Navigation action that results from key input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ZoomIn(u32),
    ZoomOut(u32),
    /// Go-to-page prompt was opened
    OpenPrompt,
    /// Text typed into the go-to-page prompt, unparsed
    SubmitPrompt(String),
    Quit,
    None,
}

/// Map a legacy keyboard code to an action
pub fn action_for_key_code(code: u32) -> NavigationAction {
    match code {
        KEY_LEFT | KEY_PAGE_UP => NavigationAction::PrevPage,
        KEY_RIGHT | KEY_PAGE_DOWN | KEY_SPACE => NavigationAction::NextPage,
        _ => NavigationAction::None,
    }
}

fn key_code(key: &Key<&str>) -> Option<u32> {
    match key {
        Key::Named(Named::ArrowLeft) => Some(KEY_LEFT),
        Key::Named(Named::ArrowRight) => Some(KEY_RIGHT),
        Key::Named(Named::PageUp) => Some(KEY_PAGE_UP),
        Key::Named(Named::PageDown) => Some(KEY_PAGE_DOWN),
        Key::Named(Named::Space) | Key::Character(" ") => Some(KEY_SPACE),
        _ => None,
    }
}

/// Key handler for page navigation and the go-to-page prompt
pub struct KeyHandler {
    mode: InputMode,
    buffer: String,
}

impl KeyHandler {
    pub fn new() -> Self {
        Self {
            mode: InputMode::Normal,
            buffer: String::new(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Pending digits in normal mode, or the prompt text in prompt mode
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Open the go-to-page prompt, e.g. from a button
    pub fn open_prompt(&mut self) -> NavigationAction {
        self.mode = InputMode::Prompt;
        self.buffer.clear();
        NavigationAction::OpenPrompt
    }

    /// Process a key press and return the corresponding action
    pub fn handle_key(&mut self, key: &Key) -> NavigationAction {
        match self.mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Prompt => self.handle_prompt_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: &Key) -> NavigationAction {
        let key = key.as_ref();
        if let Some(code) = key_code(&key) {
            self.buffer.clear();
            return action_for_key_code(code);
        }

        match key {
            Key::Character("j") => NavigationAction::NextPage,
            Key::Character("k") => NavigationAction::PrevPage,

            Key::Named(Named::Home) => NavigationAction::FirstPage,
            Key::Named(Named::End) | Key::Character("G") => NavigationAction::LastPage,

            // gg
            Key::Character("g") => {
                if self.buffer == "g" {
                    self.buffer.clear();
                    NavigationAction::FirstPage
                } else {
                    self.buffer = "g".to_string();
                    NavigationAction::None
                }
            }

            Key::Character("+") | Key::Character("=") => NavigationAction::ZoomIn(1),
            Key::Character("-") => NavigationAction::ZoomOut(1),

            Key::Character("q") | Key::Character("Q") => NavigationAction::Quit,

            Key::Character(":") => self.open_prompt(),

            // Digits followed by Enter jump without opening the prompt
            Key::Character(c) if c.chars().all(|ch| ch.is_ascii_digit()) => {
                if self.buffer == "g" {
                    self.buffer.clear();
                }
                self.buffer.push_str(c);
                NavigationAction::None
            }

            Key::Named(Named::Enter) if !self.buffer.is_empty() => {
                NavigationAction::SubmitPrompt(std::mem::take(&mut self.buffer))
            }

            Key::Named(Named::Escape) => {
                self.buffer.clear();
                NavigationAction::None
            }

            _ => NavigationAction::None,
        }
    }

    fn handle_prompt_mode(&mut self, key: &Key) -> NavigationAction {
        match key.as_ref() {
            Key::Named(Named::Enter) => {
                self.mode = InputMode::Normal;
                NavigationAction::SubmitPrompt(std::mem::take(&mut self.buffer))
            }

            Key::Named(Named::Escape) => {
                self.mode = InputMode::Normal;
                self.buffer.clear();
                NavigationAction::None
            }

            Key::Named(Named::Backspace) => {
                self.buffer.pop();
                NavigationAction::None
            }

            Key::Named(Named::Space) => {
                self.buffer.push(' ');
                NavigationAction::None
            }

            Key::Character(c) => {
                self.buffer.push_str(c);
                NavigationAction::None
            }

            _ => NavigationAction::None,
        }
    }
}

impl Default for KeyHandler {
    fn default() -> Self {
        Self::new()
    }
}
