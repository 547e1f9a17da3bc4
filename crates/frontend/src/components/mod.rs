pub mod map_view;
pub mod pin_form;
pub mod pin_list;
pub mod share_panel;
