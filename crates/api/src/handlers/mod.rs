pub mod dashboard;
pub mod devices;
pub mod groups;
pub mod images;
