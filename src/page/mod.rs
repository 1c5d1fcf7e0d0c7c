pub mod landing;
pub mod locators;

pub use landing::{LandingPage, PromoDismissal, ScrollPolicy, ScrollSummary, ViewportBox, WaitPolicy};
pub use locators::Locators;
