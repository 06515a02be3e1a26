use crate::model::{PrecipitationUnit, TemperatureUnit, UnitPreferences, WindSpeedUnit};

/// One row of the units menu: the bulk preset switch on top, then two
/// options per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRow {
    Switch,
    Temperature(TemperatureUnit),
    WindSpeed(WindSpeedUnit),
    Precipitation(PrecipitationUnit),
}

pub const MENU_ROWS: [MenuRow; 7] = [
    MenuRow::Switch,
    MenuRow::Temperature(TemperatureUnit::Celsius),
    MenuRow::Temperature(TemperatureUnit::Fahrenheit),
    MenuRow::WindSpeed(WindSpeedUnit::Kmh),
    MenuRow::WindSpeed(WindSpeedUnit::Mph),
    MenuRow::Precipitation(PrecipitationUnit::Millimeters),
    MenuRow::Precipitation(PrecipitationUnit::Inches),
];

/// Units dropdown state. The preference enums guarantee exactly one
/// selected option per category; the switch row bulk-applies a preset
/// and flips its own prompt.
#[derive(Debug)]
pub struct UnitsMenu {
    open: bool,
    cursor: usize,
    prefs: UnitPreferences,
    switch_prompts_imperial: bool,
}

impl Default for UnitsMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitsMenu {
    pub fn new() -> Self {
        Self {
            open: false,
            cursor: 0,
            prefs: UnitPreferences::default(),
            switch_prompts_imperial: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        self.cursor = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_units(&self) -> UnitPreferences {
        self.prefs
    }

    pub fn switch_label(&self) -> &'static str {
        if self.switch_prompts_imperial {
            "Switch to Imperial"
        } else {
            "Switch to Metric"
        }
    }

    pub fn is_selected(&self, row: MenuRow) -> bool {
        match row {
            MenuRow::Switch => false,
            MenuRow::Temperature(unit) => self.prefs.temperature == unit,
            MenuRow::WindSpeed(unit) => self.prefs.wind_speed == unit,
            MenuRow::Precipitation(unit) => self.prefs.precipitation == unit,
        }
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if !self.open {
            return;
        }
        let last = MENU_ROWS.len() - 1;
        self.cursor = if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.cursor
                .saturating_add(delta.unsigned_abs() as usize)
                .min(last)
        };
    }

    /// Apply the highlighted row, close the menu, and hand back the
    /// resulting preferences so the orchestrator can refetch.
    pub fn apply_highlighted(&mut self) -> UnitPreferences {
        match MENU_ROWS[self.cursor] {
            MenuRow::Switch => self.apply_switch(),
            MenuRow::Temperature(unit) => self.prefs.temperature = unit,
            MenuRow::WindSpeed(unit) => self.prefs.wind_speed = unit,
            MenuRow::Precipitation(unit) => self.prefs.precipitation = unit,
        }
        self.open = false;
        self.prefs
    }

    fn apply_switch(&mut self) {
        if self.switch_prompts_imperial {
            self.prefs = UnitPreferences::imperial();
        } else {
            self.prefs = UnitPreferences::metric();
        }
        self.switch_prompts_imperial = !self.switch_prompts_imperial;
    }
}
