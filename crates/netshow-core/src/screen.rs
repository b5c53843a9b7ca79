//! Status screen view model: background plus a few positioned text fields.

use heapless::{String, Vec};
use log::debug;

/// Bytes kept per field; longer text is truncated.
pub const FIELD_TEXT_BYTES: usize = 48;
pub const MAX_FIELDS: usize = 4;

pub const PLACEHOLDER_STATUS: &str = "Connecting...";
pub const PLACEHOLDER_SSID: &str = "SSID: ...";
pub const PLACEHOLDER_MAC: &str = "MAC: ...";
pub const WIFI_ERROR_TEXT: &str = "Wi-Fi Error";

/// 24-bit `0xRRGGBB` color.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Self = Self(0x00_00_00);
    pub const WHITE: Self = Self(0xFF_FF_FF);

    pub const fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }

    /// Perceived brightness, 0..=255 (integer BT.601 weights).
    pub const fn luma(self) -> u8 {
        let (r, g, b) = self.rgb();
        ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldRole {
    /// Connection status until an address is known, then the IP line.
    Ip,
    Ssid,
    Mac,
}

/// Where and how a field is created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldSpec {
    pub role: FieldRole,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub placeholder: &'static str,
}

/// Default layout for the 400x240 panel.
pub const STATUS_LAYOUT: [FieldSpec; 3] = [
    FieldSpec {
        role: FieldRole::Ip,
        x: 50,
        y: 70,
        color: Color::WHITE,
        placeholder: PLACEHOLDER_STATUS,
    },
    FieldSpec {
        role: FieldRole::Ssid,
        x: 50,
        y: 110,
        color: Color::WHITE,
        placeholder: PLACEHOLDER_SSID,
    },
    FieldSpec {
        role: FieldRole::Mac,
        x: 50,
        y: 150,
        color: Color::WHITE,
        placeholder: PLACEHOLDER_MAC,
    },
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextField {
    pub role: FieldRole,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    text: String<FIELD_TEXT_BYTES>,
}

impl TextField {
    pub fn text(&self) -> &str {
        self.text.as_str()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScreenError {
    DuplicateField(FieldRole),
    UnknownField(FieldRole),
    TooManyFields,
}

/// Root of everything drawn on the panel.
#[derive(Clone, Debug)]
pub struct StatusScreen {
    background: Color,
    fields: Vec<TextField, MAX_FIELDS>,
    revision: u32,
}

impl StatusScreen {
    pub const fn new(background: Color) -> Self {
        Self {
            background,
            fields: Vec::new(),
            revision: 0,
        }
    }

    /// One field per layout entry, each showing its placeholder.
    pub fn with_layout(background: Color, layout: &[FieldSpec]) -> Result<Self, ScreenError> {
        let mut screen = Self::new(background);
        for spec in layout {
            screen.add_field(*spec)?;
        }
        Ok(screen)
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn fields(&self) -> &[TextField] {
        &self.fields
    }

    /// Bumped on every field creation or text write.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn add_field(&mut self, spec: FieldSpec) -> Result<(), ScreenError> {
        if self.field(spec.role).is_some() {
            return Err(ScreenError::DuplicateField(spec.role));
        }

        let field = TextField {
            role: spec.role,
            x: spec.x,
            y: spec.y,
            color: spec.color,
            text: truncated(spec.placeholder),
        };
        self.fields
            .push(field)
            .map_err(|_| ScreenError::TooManyFields)?;
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    pub fn set_text(&mut self, role: FieldRole, text: &str) -> Result<(), ScreenError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.role == role)
            .ok_or(ScreenError::UnknownField(role))?;

        field.text = truncated(text);
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    pub fn field(&self, role: FieldRole) -> Option<&TextField> {
        self.fields.iter().find(|field| field.role == role)
    }

    pub fn text(&self, role: FieldRole) -> Option<&str> {
        self.field(role).map(TextField::text)
    }
}

/// Output side of the screen: attach to the panel and push pixels.
pub trait ScreenSink {
    type Error: core::fmt::Debug;

    fn present(&mut self, screen: &StatusScreen) -> Result<(), Self::Error>;
}

fn truncated(text: &str) -> String<FIELD_TEXT_BYTES> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            debug!("screen: truncated field text at {} bytes", out.len());
            break;
        }
    }
    out
}
