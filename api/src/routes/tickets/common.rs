use db::models::{ticket, ticket_attachment, ticket_comment, user::Role};
use serde::Serialize;
use services::comment_service::CommentView;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[serde(flatten)]
    pub comment: ticket_comment::Model,
    pub author_name: Option<String>,
    pub author_role: Option<Role>,
}

impl From<CommentView> for CommentResponse {
    fn from(v: CommentView) -> Self {
        Self {
            comment: v.comment,
            author_name: v.author_name,
            author_role: v.author_role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListResponse {
    pub tickets: Vec<ticket::Model>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailResponse {
    #[serde(flatten)]
    pub ticket: ticket::Model,
    pub comments: Vec<CommentResponse>,
    pub attachments: Vec<ticket_attachment::Model>,
}
