pub mod controls;
pub mod debug;
pub mod grid;
pub mod help;
pub mod preset_list;
pub mod series_selector;
pub mod text_input;
