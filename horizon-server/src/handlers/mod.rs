pub mod check;
pub mod images;
