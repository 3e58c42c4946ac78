use crate::domain::entities::listing::{Breakpoint, ColumnSpec};

impl Breakpoint {
    pub fn from_width(width: f64) -> Self {
        match width {
            w if w >= 1600.0 => Breakpoint::Xxl,
            w if w >= 1200.0 => Breakpoint::Xl,
            w if w >= 992.0 => Breakpoint::Lg,
            w if w >= 768.0 => Breakpoint::Md,
            w if w >= 576.0 => Breakpoint::Sm,
            _ => Breakpoint::Xs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn from_width(width: f64) -> Self {
        if width < 768.0 {
            DeviceClass::Mobile
        } else if width < 1024.0 {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Cards,
    Table,
}

impl From<DeviceClass> for TableLayout {
    fn from(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Mobile => TableLayout::Cards,
            DeviceClass::Tablet | DeviceClass::Desktop => TableLayout::Table,
        }
    }
}

pub fn visible_columns(columns: &[ColumnSpec], breakpoint: Breakpoint) -> Vec<&ColumnSpec> {
    columns
        .iter()
        .filter(|column| {
            column
                .responsive
                .iter()
                .min()
                .map_or(true, |smallest| breakpoint >= *smallest)
        })
        .collect()
}
