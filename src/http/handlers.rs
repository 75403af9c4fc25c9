use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::app::engagement::EngagementService;
use crate::app::journal::JournalService;
use crate::app::media::{self, MediaService};
use crate::app::posts::PostService;
use crate::app::tags::TagService;
use crate::app::users::UserService;
use crate::domain::engagement::LikeState;
use crate::domain::journal::DayBucket;
use crate::domain::post::{NewPost, Placement, Post, PostId, PostKind, Thread};
use crate::domain::tag::TagList;
use crate::domain::user::User;
use crate::http::{AppError, CurrentUser};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    let service = UserService::new(state.db.clone());
    let user = service
        .create_user(&payload.username)
        .await
        .map_err(|err| AppError::from_service(err, "failed to create user"))?;

    Ok(Json(user))
}

pub async fn timeline(State(state): State<AppState>) -> Result<Json<ListResponse<Post>>, AppError> {
    let service = PostService::new(state.db.clone());
    let posts = service
        .timeline(true)
        .await
        .map_err(|err| AppError::from_service(err, "failed to load timeline"))?;

    Ok(Json(ListResponse { items: posts }))
}

pub async fn get_thread(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Thread>, AppError> {
    let service = PostService::new(state.db.clone());
    let thread = service
        .thread(PostId(id))
        .await
        .map_err(|err| AppError::from_service(err, "failed to load thread"))?;

    Ok(Json(thread))
}

#[derive(Serialize)]
pub struct CreatePostResponse {
    pub id: PostId,
    /// Where the new post is displayed: the parent thread for replies, the
    /// journal for journal entries, the timeline otherwise.
    pub location: String,
}

pub async fn create_post(
    user: CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreatePostResponse>, AppError> {
    let form = PostForm::read(multipart).await?;
    let kind = PostKind::from_form(form.post_type.as_deref())
        .ok_or_else(|| AppError::bad_request("invalid post_type"))?;
    publish(&state, user, form, kind).await.map(Json)
}

pub async fn create_journal_post(
    user: CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreatePostResponse>, AppError> {
    let mut form = PostForm::read(multipart).await?;
    form.parent_id = None;
    publish(&state, user, form, PostKind::Journal).await.map(Json)
}

async fn publish(
    state: &AppState,
    user: CurrentUser,
    form: PostForm,
    kind: PostKind,
) -> Result<CreatePostResponse, AppError> {
    // Reject before touching storage so a refused post leaves no file behind.
    if form.content.is_empty() {
        return Err(AppError::bad_request("content cannot be empty"));
    }

    let service = PostService::new(state.db.clone());
    let placement = match form.parent_id()? {
        Some(parent_id) => {
            let parent = service
                .top_level(parent_id)
                .await
                .map_err(|err| AppError::from_service(err, "failed to load parent post"))?;
            Placement::Reply { parent }
        }
        None => Placement::TopLevel {
            kind,
            tags: form.tags.map(TagList::new),
        },
    };

    let image_url = match form.image {
        Some(image) if media::is_allowed_image(&image.content_type) => {
            let media = MediaService::new(state.storage.clone());
            let file_name = media
                .store_image(&image.file_name, &image.content_type, image.bytes)
                .await
                .map_err(|err| AppError::from_service(err, "failed to store image"))?;
            Some(media::public_url(&file_name))
        }
        Some(image) => {
            tracing::debug!(content_type = %image.content_type, "ignoring attachment with disallowed type");
            None
        }
        None => None,
    };

    let location = match &placement {
        Placement::Reply { parent } => format!("/posts/{}", parent.post_id()),
        Placement::TopLevel {
            kind: PostKind::Journal,
            ..
        } => "/journal".to_string(),
        Placement::TopLevel { .. } => "/posts".to_string(),
    };

    let id = service
        .create_post(NewPost {
            author: user.username,
            content: form.content,
            image_url,
            placement,
        })
        .await
        .map_err(|err| AppError::from_service(err, "failed to create post"))?;

    Ok(CreatePostResponse { id, location })
}

#[derive(Deserialize)]
pub struct AttachTagsRequest {
    pub tags: String,
}

#[derive(Serialize)]
pub struct AttachTagsResponse {
    pub attached: u64,
    pub tags: Vec<String>,
}

pub async fn attach_tags(
    Path(id): Path<i64>,
    _user: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AttachTagsRequest>,
) -> Result<Json<AttachTagsResponse>, AppError> {
    let posts = PostService::new(state.db.clone());
    let post = posts
        .top_level(PostId(id))
        .await
        .map_err(|err| AppError::from_service(err, "failed to load post"))?;

    let tags = TagService::new(state.db.clone());
    let attached = tags
        .attach_tags(post, &TagList::new(payload.tags))
        .await
        .map_err(|err| AppError::from_service(err, "failed to attach tags"))?;
    let names = tags
        .tags_for_post(post.post_id())
        .await
        .map_err(|err| AppError::from_service(err, "failed to load tags"))?;

    Ok(Json(AttachTagsResponse {
        attached,
        tags: names,
    }))
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub state: LikeState,
    pub like_count: i64,
}

pub async fn toggle_like(
    Path(id): Path<i64>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id = PostId(id);
    let user_id = UserService::new(state.db.clone())
        .id_for_username(&user.username)
        .await
        .map_err(|err| AppError::from_service(err, "failed to look up user"))?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    let service = EngagementService::new(state.db.clone());
    let like_state = service
        .toggle_like(user_id, post_id)
        .await
        .map_err(|err| AppError::from_service(err, "failed to toggle like"))?;
    let like_count = service
        .like_count(post_id)
        .await
        .map_err(|err| AppError::from_service(err, "failed to count likes"))?;

    Ok(Json(LikeResponse {
        state: like_state,
        like_count,
    }))
}

#[derive(Serialize)]
pub struct JournalResponse {
    pub days: Vec<DayBucket>,
}

pub async fn journal(State(state): State<AppState>) -> Result<Json<JournalResponse>, AppError> {
    let service = JournalService::new(state.db.clone(), state.journal_epoch);
    let days = service
        .days()
        .await
        .map_err(|err| AppError::from_service(err, "failed to load journal"))?;

    Ok(Json(JournalResponse { days }))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
}

pub async fn upload_image(
    _user: CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("image") {
            image = Some(ImageUpload::read(field).await?);
        }
    }
    let image = image.ok_or_else(|| AppError::bad_request("image is required"))?;

    let media = MediaService::new(state.storage.clone());
    let filename = media
        .store_image(&image.file_name, &image.content_type, image.bytes)
        .await
        .map_err(|err| AppError::from_service(err, "failed to store image"))?;

    Ok((StatusCode::CREATED, Json(UploadResponse { filename })))
}

/// Fields of the multipart form used to publish a post.
#[derive(Default)]
struct PostForm {
    content: String,
    tags: Option<String>,
    post_type: Option<String>,
    parent_id: Option<String>,
    image: Option<ImageUpload>,
}

struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

impl PostForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PostForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "content" => form.content = field.text().await.map_err(bad_multipart)?,
                "tags" => form.tags = Some(field.text().await.map_err(bad_multipart)?),
                "post_type" => form.post_type = Some(field.text().await.map_err(bad_multipart)?),
                "parent_id" => form.parent_id = Some(field.text().await.map_err(bad_multipart)?),
                "image" => {
                    let image = ImageUpload::read(field).await?;
                    // Browsers send an empty part when no file was chosen.
                    if !image.bytes.is_empty() {
                        form.image = Some(image);
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn parent_id(&self) -> Result<Option<PostId>, AppError> {
        match self.parent_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(|id| Some(PostId(id)))
                .map_err(|_| AppError::bad_request("invalid parent_id")),
        }
    }
}

impl ImageUpload {
    async fn read(field: axum::extract::multipart::Field<'_>) -> Result<Self, AppError> {
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::debug!(error = %err, "malformed multipart body");
    AppError::bad_request("invalid form data")
}
