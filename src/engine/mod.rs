pub mod answer;
pub mod chart_data;
pub mod debounce;
pub mod difficulty;
pub mod operation;
pub mod question;
pub mod random;
pub mod ranges;
pub mod stats;

pub use difficulty::Difficulty;
pub use operation::Operation;
