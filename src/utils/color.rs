use crate::notify::NotificationLevel;
use eframe::egui::Color32;

pub trait ColorExt {
    fn from_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Color32::from_rgb(r, g, b))
    }
}

/// Brand colors used across the upload screen.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub primary: Color32,
    pub secondary: Color32,
    pub accent: Color32,
    pub danger: Color32,
    pub muted: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: hex_or("#6366f1", Color32::from_rgb(99, 102, 241)),
            secondary: hex_or("#10b981", Color32::from_rgb(16, 185, 129)),
            accent: hex_or("#f59e0b", Color32::from_rgb(245, 158, 11)),
            danger: hex_or("#ef4444", Color32::from_rgb(239, 68, 68)),
            muted: Color32::from_rgb(150, 150, 150),
        }
    }
}

impl Palette {
    pub fn for_level(&self, level: NotificationLevel) -> Color32 {
        match level {
            NotificationLevel::Success => self.secondary,
            NotificationLevel::Error => self.danger,
            NotificationLevel::Warning => self.accent,
            NotificationLevel::Info => self.primary,
        }
    }
}

fn hex_or(hex: &str, fallback: Color32) -> Color32 {
    Color32::from_hex(hex).unwrap_or(fallback)
}
