pub mod knowledge_article;
pub mod notification;
pub mod session;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_comment;
pub mod user;

pub use knowledge_article::Entity as KnowledgeArticle;
pub use notification::Entity as Notification;
pub use session::Entity as Session;
pub use ticket::Entity as Ticket;
pub use ticket_attachment::Entity as TicketAttachment;
pub use ticket_comment::Entity as TicketComment;
pub use user::Entity as User;
