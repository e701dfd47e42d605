pub mod bar_chart;
pub mod menu;
pub mod profile_list;
pub mod progress_bar;
pub mod quiz_area;
pub mod stats_dashboard;
