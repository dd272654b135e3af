pub mod consultar;
pub mod health;
