pub mod map_page;
pub mod shared_view;
