pub mod feedback;
pub mod quiz;
