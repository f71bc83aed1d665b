//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Colors used by the list and summary tables
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub running: TableColor,
    pub downscaled: TableColor,
    pub unset: TableColor,
    pub request: TableColor,
    pub limit: TableColor,
    pub image: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            running: TableColor::Green,
            downscaled: TableColor::Yellow,
            unset: TableColor::DarkGrey,
            request: TableColor::Green,
            limit: TableColor::Red,
            image: TableColor::Cyan,
        }
    }
}

impl ColorTheme {
    pub fn get_replica_color(&self, replicas: Option<i32>) -> TableColor {
        match replicas {
            None => self.unset,
            Some(0) => self.downscaled,
            Some(_) => self.running,
        }
    }
}
