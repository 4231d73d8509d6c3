//! HTTP server exposing posts, tags, sitemap and robots.txt

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::content::Post;
use crate::Site;

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// 1-based page number; the whole listing when absent
    pub page: Option<usize>,
}

/// A page of the post listing
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostList {
    pub posts: Vec<Post>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Slice `posts` into the requested page
pub fn paginate(posts: Vec<Post>, page: Option<usize>, per_page: usize) -> PostList {
    let total = posts.len();
    let per_page = per_page.max(1);

    let Some(page) = page else {
        return PostList {
            posts,
            page: 1,
            total_pages: 1,
            total,
        };
    };

    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let posts = posts
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    PostList {
        posts,
        page,
        total_pages,
        total,
    }
}

/// Build the application router
pub fn router(site: Site) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/slugs", get(list_slugs))
        .route("/api/tags", get(list_tags))
        .route("/api/tags/:tag/posts", get(tag_posts))
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

/// Start the server
pub async fn start(site: Site, ip: &str, port: u16) -> Result<()> {
    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    if !site.repository.source().is_available() {
        tracing::warn!("Notion is not configured; the blog will be empty");
    }

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(site)).await?;

    Ok(())
}

async fn list_posts(State(site): State<Site>, Query(params): Query<ListParams>) -> Json<PostList> {
    let posts = site.repository.all_posts().await;
    Json(paginate(posts, params.page, site.config.per_page))
}

async fn get_post(
    State(site): State<Site>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, StatusCode> {
    site.repository
        .post_by_slug(&slug)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_slugs(State(site): State<Site>) -> Json<Vec<String>> {
    Json(site.repository.all_post_slugs().await)
}

async fn list_tags(State(site): State<Site>) -> Json<Vec<String>> {
    Json(site.repository.all_tags().await)
}

async fn tag_posts(State(site): State<Site>, Path(tag): Path<String>) -> Json<Vec<Post>> {
    Json(site.repository.posts_by_tag(&tag).await)
}

async fn sitemap(State(site): State<Site>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        site.sitemap().await,
    )
}

async fn robots(State(site): State<Site>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        site.robots(),
    )
}
