pub mod click_log;
pub mod partnership;
pub mod short_link;
pub mod user_profile;

pub use click_log::Entity as ClickLogEntity;
pub use partnership::Entity as PartnershipEntity;
pub use short_link::Entity as ShortLinkEntity;
pub use user_profile::Entity as UserProfileEntity;
