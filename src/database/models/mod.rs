pub mod comment;
pub mod media;
pub mod notification;
pub mod post;
pub mod tenant;
pub mod user;

pub use comment::{Comment, CommentStatus};
pub use media::Media;
pub use notification::{Notification, NotificationKind};
pub use post::{Post, PostStatus};
pub use tenant::{BlogSettings, SeoSettings, Tenant, TenantMember};
pub use user::User;
