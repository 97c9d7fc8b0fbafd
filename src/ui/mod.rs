pub mod panels;
pub mod plot;
pub mod results;
pub mod table;
