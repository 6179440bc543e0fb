pub mod comments;
pub mod media;
pub mod notifications;
pub mod posts;
pub mod tenants;
pub mod users;

pub use comments::CommentRepository;
pub use media::MediaRepository;
pub use notifications::NotificationRepository;
pub use posts::{PostFilter, PostRepository, PublishedSort};
pub use tenants::TenantRepository;
pub use users::UserRepository;
