pub mod view;

pub use view::TableView;
