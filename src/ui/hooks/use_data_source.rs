use std::rc::Rc;

use dioxus::prelude::*;

use crate::domain::entities::listing::Record;
use crate::domain::entities::query::{FilterValues, PageRequest, SortSpec};
use crate::usecase::services::controller::{
    ControllerServices, DataSourceController, DataSourceProps, ListState,
};

#[derive(Clone)]
pub struct DataSourceHandle {
    controller: Rc<DataSourceController>,
    pub state: Signal<ListState>,
}

impl PartialEq for DataSourceHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.controller, &other.controller)
    }
}

impl DataSourceHandle {
    pub fn set_pagination(&self, request: PageRequest) {
        self.controller.set_pagination(request);
    }

    pub fn set_sort(&self, sort: Option<SortSpec>) {
        self.controller.set_sort(sort);
    }

    pub fn set_filter_values(&self, filter_values: FilterValues) {
        self.controller.set_filter_values(filter_values);
    }

    pub fn set_items(&self, items: Vec<Record>) {
        self.controller.set_items(items);
    }

    pub fn set_data_source(&self, data_source: &str) {
        self.controller.set_data_source(data_source);
    }

    pub fn reload(&self) {
        self.controller.reload();
    }
}

pub fn use_data_source(props: DataSourceProps) -> DataSourceHandle {
    let services = use_context::<ControllerServices>();
    let controller = use_hook(move || Rc::new(DataSourceController::mount(props, services)));

    let snapshot = controller.snapshot();
    let mut state = use_signal(move || snapshot);

    let watched = controller.clone();
    use_hook(move || {
        let mut receiver = watched.subscribe();
        spawn(async move {
            while receiver.changed().await.is_ok() {
                let next = receiver.borrow_and_update().clone();
                state.set(next);
            }
        });
    });

    let mounted = controller.clone();
    use_drop(move || mounted.unmount());

    DataSourceHandle { controller, state }
}
