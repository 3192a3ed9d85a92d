pub mod entities;
pub mod request_item;
pub mod value_objects;
