pub mod entity;
pub mod improvement;
pub mod managed;
