//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for copy/save shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Save-for-later shortcut display
/// Ctrl+S works on all platforms
pub const SAVE_SHORTCUT: &str = "Ctrl+S";

/// Submit shortcut display
/// - macOS: "Cmd+D"
/// - Linux/Windows: "Ctrl+D"
#[cfg(target_os = "macos")]
pub const SUBMIT_SHORTCUT: &str = "Cmd+D";

#[cfg(not(target_os = "macos"))]
pub const SUBMIT_SHORTCUT: &str = "Ctrl+D";

/// Copy focused link shortcut display
#[cfg(target_os = "macos")]
pub const COPY_SHORTCUT: &str = "Cmd+Y";

#[cfg(not(target_os = "macos"))]
pub const COPY_SHORTCUT: &str = "Ctrl+Y";
