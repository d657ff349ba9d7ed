pub mod category;
pub mod section;
pub mod seo;
pub mod testimonial;
pub mod user;

pub use category::Category;
pub use section::{Section, SectionTranslation};
pub use seo::SeoEntry;
pub use testimonial::Testimonial;
pub use user::User;
