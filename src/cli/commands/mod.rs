pub mod enumerate;
pub mod regions;
