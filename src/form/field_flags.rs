//! Field and widget flags.
//!
//! Field flags (`/Ff`) per ISO 32000-1:2008 Section 12.7.3, annotation flags (`/F`)
//! per Section 12.5.3. Only the bits that change how a field is filled or
//! flattened are named here.

use bitflags::bitflags;

bitflags! {
    /// Text field flags (field type Tx).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextFieldFlags: u32 {
        /// Bit 1: Field is read-only
        const READ_ONLY = 1 << 0;

        /// Bit 13: Text may include multiple lines
        const MULTILINE = 1 << 12;

        /// Bit 14: Text should be displayed as asterisks (password)
        const PASSWORD = 1 << 13;

        /// Bit 25: Field is divided into equally spaced positions (comb)
        /// MaxLen must be set when using this flag
        const COMB = 1 << 24;
    }
}

bitflags! {
    /// Button field flags (field type Btn).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ButtonFieldFlags: u32 {
        /// Bit 15: (for checkbox/radio) No toggle to off
        const NO_TOGGLE_TO_OFF = 1 << 14;

        /// Bit 16: This is a radio button (if not set and not PUSHBUTTON, it's a checkbox)
        const RADIO = 1 << 15;

        /// Bit 17: This is a push button
        const PUSHBUTTON = 1 << 16;
    }
}

bitflags! {
    /// Annotation flags on widget annotations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WidgetFlags: u32 {
        /// Bit 2: Do not display or print
        const HIDDEN = 1 << 1;

        /// Bit 3: Print the annotation
        const PRINT = 1 << 2;

        /// Bit 6: Do not display on screen
        const NO_VIEW = 1 << 5;
    }
}

impl WidgetFlags {
    /// Whether a widget with these flags should be skipped when flattening.
    pub fn is_invisible(self) -> bool {
        self.intersects(WidgetFlags::HIDDEN | WidgetFlags::NO_VIEW)
    }
}
