use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::listing::Breakpoint;
use crate::ui::layout::{DeviceClass, TableLayout};

const INITIAL_WIDTH: f64 = 1280.0;

#[derive(Clone, Copy)]
pub struct ListViewState {
    pub search: Signal<String>,
    pub width: Signal<f64>,
    pub expanded_card: Signal<Option<usize>>,
}

impl ListViewState {
    pub fn new(initial_search: String) -> Self {
        Self {
            search: use_signal(move || initial_search),
            width: use_signal(|| INITIAL_WIDTH),
            expanded_card: use_signal(|| None::<usize>),
        }
    }

    pub fn breakpoint(&self) -> Breakpoint {
        Breakpoint::from_width((self.width)())
    }

    pub fn layout(&self) -> TableLayout {
        TableLayout::from(DeviceClass::from_width((self.width)()))
    }
}
