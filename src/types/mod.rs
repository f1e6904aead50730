pub mod climate_profile;
pub mod element;
pub mod mode;
pub mod point;
pub mod quadrant;
pub mod query;
pub mod responses;
pub mod time_range;
