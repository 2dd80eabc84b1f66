pub mod item;
pub mod post_record;
