pub mod answer_box;
pub mod flashcard;
pub mod keyboard_diagram;
pub mod level_list;
pub mod progress_bar;
pub mod quiz_view;
pub mod session_sidebar;
pub mod word_table;
