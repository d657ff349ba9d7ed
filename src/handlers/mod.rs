pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod sections;
pub mod seo;
pub mod testimonials;
pub mod uploads;
