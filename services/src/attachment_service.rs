use crate::error::{ServiceError, ServiceResult};
use crate::policy::{self, Actor};
use crate::ticket_service::{TicketService, remove_attachment_files};
use db::models::ticket_attachment;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::path::{Path, PathBuf};
use util::paths;

/// MIME types accepted for ticket attachments.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "text/csv",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/zip",
];

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Content type without parameters, falling back to a guess from the filename.
pub fn resolve_mime(file_name: &str, declared: Option<&str>) -> String {
    let declared = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    match declared {
        Some(ct) => ct,
        None => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned(),
    }
}

/// Last path component of an uploaded filename, never empty.
pub fn sanitize_file_name(raw: &str) -> String {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();
    if name.is_empty() || name == "." || name == ".." {
        "file".to_owned()
    } else {
        name
    }
}

/// Generated storage name: random UUID plus the original extension when it is sane.
fn stored_name(original: &str) -> String {
    let id = uuid::Uuid::new_v4();
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);
    match ext {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

pub struct AttachmentService;

impl AttachmentService {
    pub async fn list(
        db: &DatabaseConnection,
        actor: &Actor,
        ticket_id: i64,
    ) -> ServiceResult<Vec<ticket_attachment::Model>> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        Ok(ticket_attachment::Model::for_ticket(db, ticket.id).await?)
    }

    /// Checks a file against the size limit and type whitelist.
    ///
    /// Returns the sanitized original name and the resolved MIME type.
    pub fn validate(file: &UploadedFile, max_bytes: usize) -> ServiceResult<(String, String)> {
        if file.bytes.is_empty() {
            return Err(ServiceError::validation("Uploaded file is empty"));
        }
        if file.bytes.len() > max_bytes {
            return Err(ServiceError::validation(format!(
                "File exceeds the maximum size of {} MB",
                max_bytes / (1024 * 1024)
            )));
        }
        let original_name = sanitize_file_name(&file.file_name);
        let mime = resolve_mime(&original_name, file.content_type.as_deref());
        if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(ServiceError::validation(format!(
                "File type '{mime}' is not allowed"
            )));
        }
        Ok((original_name, mime))
    }

    /// Anyone who can see the ticket may attach files to it.
    pub async fn upload(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        ticket_id: i64,
        file: UploadedFile,
        max_bytes: usize,
    ) -> ServiceResult<ticket_attachment::Model> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        let (original_name, mime) = Self::validate(&file, max_bytes)?;
        Self::store(db, uploads_root, actor, ticket.id, &file, &original_name, &mime).await
    }

    /// Stores several files as one unit.
    ///
    /// Every file is validated before any is written. If storing one fails,
    /// the ones already stored are removed again.
    pub async fn upload_many(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        ticket_id: i64,
        files: Vec<UploadedFile>,
        max_bytes: usize,
    ) -> ServiceResult<Vec<ticket_attachment::Model>> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        if files.is_empty() {
            return Err(ServiceError::validation("No file provided"));
        }
        let checked = files
            .iter()
            .map(|f| Self::validate(f, max_bytes))
            .collect::<ServiceResult<Vec<_>>>()?;

        let mut stored = Vec::with_capacity(files.len());
        for (file, (original_name, mime)) in files.iter().zip(&checked) {
            match Self::store(db, uploads_root, actor, ticket.id, file, original_name, mime).await {
                Ok(model) => stored.push(model),
                Err(err) => {
                    tracing::warn!(ticket_id = ticket.id, rolled_back = stored.len(), "multi-file upload failed");
                    remove_attachment_files(uploads_root, &stored).await;
                    ticket_attachment::Entity::delete_many()
                        .filter(ticket_attachment::Column::Id.is_in(stored.iter().map(|a| a.id).collect::<Vec<_>>()))
                        .exec(db)
                        .await?;
                    return Err(err);
                }
            }
        }
        Ok(stored)
    }

    /// Writes a validated file and records it. The file is removed again if the row insert fails.
    async fn store(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        ticket_id: i64,
        file: &UploadedFile,
        original_name: &str,
        mime: &str,
    ) -> ServiceResult<ticket_attachment::Model> {
        let relative = paths::attachment_relative_path(ticket_id, &stored_name(original_name));
        let relative_str = relative.to_string_lossy().replace('\\', "/");
        let absolute = uploads_root.join(&relative);
        paths::ensure_parent_dir(&absolute)?;
        tokio::fs::write(&absolute, &file.bytes).await?;

        let created = ticket_attachment::Model::create(
            db,
            ticket_id,
            actor.id,
            original_name,
            &relative_str,
            file.bytes.len() as i64,
            mime,
        )
        .await;

        match created {
            Ok(model) => {
                tracing::info!(
                    ticket_id,
                    attachment_id = model.id,
                    size = model.size_bytes,
                    "attachment stored"
                );
                Ok(model)
            }
            Err(err) => {
                let _ = tokio::fs::remove_file(&absolute).await;
                Err(err.into())
            }
        }
    }

    pub async fn get(
        db: &DatabaseConnection,
        actor: &Actor,
        ticket_id: i64,
        attachment_id: i64,
    ) -> ServiceResult<ticket_attachment::Model> {
        let ticket = TicketService::get_visible(db, actor, ticket_id).await?;
        ticket_attachment::Entity::find_by_id(attachment_id)
            .filter(ticket_attachment::Column::TicketId.eq(ticket.id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Attachment {attachment_id} not found"))
            })
    }

    /// Metadata plus the on-disk path. A missing file is reported as not found.
    pub async fn open(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        ticket_id: i64,
        attachment_id: i64,
    ) -> ServiceResult<(ticket_attachment::Model, PathBuf)> {
        let attachment = Self::get(db, actor, ticket_id, attachment_id).await?;
        let path = paths::resolve_stored(uploads_root, &attachment.stored_path)
            .ok_or_else(|| ServiceError::not_found("Attachment file not found"))?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok((attachment, path)),
            Ok(_) => Err(ServiceError::not_found("Attachment file not found")),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(attachment_id, path = %path.display(), "attachment file missing on disk");
                Err(ServiceError::not_found("Attachment file not found"))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the file, then the row.
    pub async fn delete(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        ticket_id: i64,
        attachment_id: i64,
    ) -> ServiceResult<()> {
        let attachment = Self::get(db, actor, ticket_id, attachment_id).await?;
        if !policy::can_delete_attachment(actor, &attachment) {
            return Err(ServiceError::forbidden(
                "Only the uploader or IT staff can delete this attachment",
            ));
        }
        if let Some(path) = paths::resolve_stored(uploads_root, &attachment.stored_path) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        ticket_attachment::Entity::delete_by_id(attachment.id)
            .exec(db)
            .await?;
        tracing::info!(ticket_id, attachment_id, user_id = actor.id, "attachment deleted");
        Ok(())
    }
}
