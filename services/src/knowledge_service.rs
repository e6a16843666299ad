use crate::error::{ServiceError, ServiceResult};
use crate::policy::{self, Actor, Capability};
use chrono::Utc;
use db::filters::like_pattern;
use db::models::knowledge_article::{self, Tags};
use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};

pub use db::models::knowledge_article::Model as Article;

#[derive(Debug, Clone)]
pub struct CreateArticle {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

fn required(field: &str, value: &str) -> ServiceResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(v.to_owned())
}

/// Trimmed, lowercased, de-duplicated, blank-free.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub struct KnowledgeService;

impl KnowledgeService {
    pub async fn list(db: &DatabaseConnection, query: &ArticleQuery) -> ServiceResult<Vec<Article>> {
        let mut cond = Condition::all();
        if let Some(category) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            cond = cond.add(knowledge_article::Column::Category.eq(category));
        }
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = like_pattern(term);
            let lower_like = |expr: SimpleExpr| {
                Expr::expr(Func::lower(expr)).like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            let tags_text =
                Func::cast_as(Expr::col(knowledge_article::Column::Tags), Alias::new("text"));
            cond = cond.add(
                Condition::any()
                    .add(lower_like(Expr::col(knowledge_article::Column::Title).into()))
                    .add(lower_like(Expr::col(knowledge_article::Column::Content).into()))
                    .add(lower_like(tags_text.into())),
            );
        }
        Ok(knowledge_article::Entity::find()
            .filter(cond)
            .order_by_desc(knowledge_article::Column::ViewCount)
            .order_by_desc(knowledge_article::Column::UpdatedAt)
            .all(db)
            .await?)
    }

    /// Fetches an article and counts the view.
    pub async fn view(db: &DatabaseConnection, id: i64) -> ServiceResult<Article> {
        let exists = knowledge_article::Entity::find_by_id(id).one(db).await?;
        if exists.is_none() {
            return Err(ServiceError::not_found(format!("Article {id} not found")));
        }
        knowledge_article::Model::increment_views(db, id).await?;
        knowledge_article::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Article {id} not found")))
    }

    pub async fn create(
        db: &DatabaseConnection,
        actor: &Actor,
        req: CreateArticle,
    ) -> ServiceResult<Article> {
        policy::require(actor, Capability::ManageKnowledgeBase)?;
        let article = knowledge_article::Model::create(
            db,
            actor.id,
            &required("Title", &req.title)?,
            &required("Content", &req.content)?,
            &required("Category", &req.category)?,
            clean_tags(req.tags),
        )
        .await?;
        tracing::info!(article_id = article.id, by = actor.id, "knowledge article created");
        Ok(article)
    }

    pub async fn update(
        db: &DatabaseConnection,
        actor: &Actor,
        id: i64,
        req: UpdateArticle,
    ) -> ServiceResult<Article> {
        policy::require(actor, Capability::ManageKnowledgeBase)?;
        let current = knowledge_article::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Article {id} not found")))?;
        let mut active = current.into_active_model();
        if let Some(title) = req.title {
            active.title = Set(required("Title", &title)?);
        }
        if let Some(content) = req.content {
            active.content = Set(required("Content", &content)?);
        }
        if let Some(category) = req.category {
            active.category = Set(required("Category", &category)?);
        }
        if let Some(tags) = req.tags {
            active.tags = Set(Tags(clean_tags(tags)));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, actor: &Actor, id: i64) -> ServiceResult<()> {
        policy::require(actor, Capability::ManageKnowledgeBase)?;
        let res = knowledge_article::Entity::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found(format!("Article {id} not found")));
        }
        tracing::info!(article_id = id, by = actor.id, "knowledge article deleted");
        Ok(())
    }
}
