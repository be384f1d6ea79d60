pub mod category;
pub mod demand;
pub mod month;
pub mod plan;
pub mod recommendation;
