//! Post handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use inkpost_core::domain::{Post, PostId, PostWithAuthor};
use inkpost_core::services::DEFAULT_LIST_LIMIT;
use inkpost_shared::dto::{AuthorResponse, ListPostsQuery, PostDetailResponse, PostResponse};

use super::form::PostForm;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Largest page a client may ask for.
const MAX_LIST_LIMIT: u64 = 100;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.as_uuid(),
        title: post.title,
        summary: post.summary,
        content: post.content,
        cover: post.cover,
        author: post.author_id.as_uuid(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn post_detail_response(PostWithAuthor { post, author }: PostWithAuthor) -> PostDetailResponse {
    PostDetailResponse {
        id: post.id.as_uuid(),
        title: post.title,
        summary: post.summary,
        content: post.content,
        cover: post.cover,
        author: AuthorResponse {
            id: author.id.as_uuid(),
            username: author.username,
        },
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn parse_post_id(raw: &str) -> AppResult<PostId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid post id '{raw}'")))
}

/// POST /post - multipart with a required cover `file`.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = PostForm::read(payload, state.max_upload_bytes).await?;
    let draft = form.draft();
    let cover = form
        .file
        .ok_or_else(|| AppError::BadRequest("A cover image file is required".to_string()))?;

    let post = state
        .posts
        .create_post(identity.user_id, draft, cover)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PUT /post - multipart with the post `id` and an optional new `file`.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = PostForm::read(payload, state.max_upload_bytes).await?;
    let draft = form.draft();
    let post_id = match form.id.as_deref() {
        Some(raw) => parse_post_id(raw)?,
        None => return Err(AppError::BadRequest("Post id is required".to_string())),
    };

    let post = state
        .posts
        .update_post(post_id, identity.user_id, draft, form.file)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// GET /post - newest posts first.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let posts = state.posts.list_posts(limit).await?;
    tracing::debug!(count = posts.len(), limit, "Listed posts");

    Ok(HttpResponse::Ok().json(
        posts
            .into_iter()
            .map(post_detail_response)
            .collect::<Vec<_>>(),
    ))
}

/// GET /post/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;

    let post = state.posts.get_post(post_id).await?;

    Ok(HttpResponse::Ok().json(post_detail_response(post)))
}
