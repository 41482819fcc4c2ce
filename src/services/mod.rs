pub mod dashboard;
pub mod directory;
pub mod email;
pub mod link_service;
pub mod notifications;
pub mod partnership_service;
pub mod redirect;
pub mod shortener;
pub mod users;

use std::sync::Arc;

use crate::config::StaticConfig;
use crate::storage::SeaOrmStorage;

pub use dashboard::{DashboardData, DashboardService, DashboardStats};
pub use directory::{Directory, DirectoryQuery, DirectoryService};
pub use email::{EmailMessage, EmailSender};
pub use link_service::{CreateLinkRequest, CreatedLink, LinkService};
pub use partnership_service::{AdminAction, AdminOverview, PartnershipService};
pub use redirect::{ClickContext, RedirectResolver, Resolution};
pub use shortener::ShortenerService;
pub use users::{Identity, UserService};

/// 请求处理共享的服务集合
#[derive(Clone)]
pub struct AppServices {
    pub storage: Arc<SeaOrmStorage>,
    pub resolver: Arc<RedirectResolver>,
    pub links: Arc<LinkService>,
    pub partnerships: Arc<PartnershipService>,
    pub users: Arc<UserService>,
    pub directory: Arc<DirectoryService>,
    pub dashboard: Arc<DashboardService>,
    pub shortener: Arc<ShortenerService>,
}

impl AppServices {
    /// 用给定的协作方组装；测试里注入假的邮件和短链服务
    pub fn build(
        storage: Arc<SeaOrmStorage>,
        email: Arc<dyn EmailSender>,
        shortener: Arc<ShortenerService>,
    ) -> Self {
        let users = Arc::new(UserService::new(storage.clone()));
        Self {
            resolver: Arc::new(RedirectResolver::from_storage(storage.clone())),
            links: Arc::new(LinkService::new(storage.clone(), shortener.clone())),
            partnerships: Arc::new(PartnershipService::new(storage.clone(), email)),
            directory: Arc::new(DirectoryService::new(storage.clone())),
            dashboard: Arc::new(DashboardService::new(storage.clone(), users.clone())),
            users,
            shortener,
            storage,
        }
    }

    pub fn from_config(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Self {
        let email = email::build_email_sender(&config.email);
        let shortener = Arc::new(ShortenerService::from_config(&config.shortener));
        Self::build(storage, email, shortener)
    }
}
