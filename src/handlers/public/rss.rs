use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::IntoResponse;

use crate::config;
use crate::database::models::{Post, Tenant};
use crate::error::ApiError;
use crate::state::AppState;
use crate::text::escape_xml;

use super::blog::resolve_tenant;

/// GET /api/public/tenants/:tenant_slug/rss.xml - RSS 2.0 feed of the
/// 20 most recent published posts.
pub async fn feed(
    State(state): State<AppState>,
    Path(tenant_slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = resolve_tenant(&state, &tenant_slug).await?;
    let posts = state.posts().recent_published(tenant.id, 20).await?;

    let xml = render_feed(&tenant, &posts);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/rss+xml; charset=utf-8"),
    );
    Ok((headers, xml))
}

fn render_feed(tenant: &Tenant, posts: &[Post]) -> String {
    let base_domain = &config::config().site.base_domain;
    let blog_url = format!("https://{}.{}", tenant.slug, base_domain);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n");
    xml.push_str("  <channel>\n");
    xml.push_str(&format!(
        "    <title>{}</title>\n",
        escape_xml(&tenant.name)
    ));
    xml.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(tenant.description.as_deref().unwrap_or(""))
    ));
    xml.push_str(&format!("    <link>{}</link>\n", escape_xml(&blog_url)));
    xml.push_str("    <language>en-us</language>\n");

    for post in posts {
        let link = format!("{}/posts/{}", blog_url, post.slug);
        xml.push_str("    <item>\n");
        xml.push_str(&format!(
            "      <title>{}</title>\n",
            escape_xml(&post.title)
        ));
        xml.push_str(&format!(
            "      <description>{}</description>\n",
            escape_xml(post.excerpt.as_deref().unwrap_or(""))
        ));
        xml.push_str(&format!("      <link>{}</link>\n", escape_xml(&link)));
        xml.push_str(&format!("      <guid>{}</guid>\n", escape_xml(&link)));
        if let Some(published_at) = post.published_at {
            xml.push_str(&format!(
                "      <pubDate>{}</pubDate>\n",
                published_at.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        xml.push_str(&format!(
            "      <author>{}</author>\n",
            escape_xml(&post.author_name)
        ));
        for tag in &post.tags {
            xml.push_str(&format!(
                "      <category>{}</category>\n",
                escape_xml(tag)
            ));
        }
        xml.push_str("    </item>\n");
    }

    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{BlogSettings, PostStatus};
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn tenant() -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            slug: "my-blog".to_string(),
            name: "My <Blog>".to_string(),
            description: Some("Posts & notes".to_string()),
            owner_id: Uuid::new_v4(),
            settings: Json(BlogSettings::default()),
            members: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn post() -> Post {
        Post {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Hello & welcome".to_string(),
            slug: "hello-welcome".to_string(),
            excerpt: Some("First post".to_string()),
            body_html: None,
            body_markdown: None,
            author_name: "Jane Doe".to_string(),
            tags: vec!["intro".to_string()],
            categories: vec![],
            cover_image_url: None,
            status: PostStatus::Published,
            published_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn feed_escapes_markup_and_formats_dates() {
        let xml = render_feed(&tenant(), &[post()]);

        assert!(xml.contains("<title>My &lt;Blog&gt;</title>"));
        assert!(xml.contains("<title>Hello &amp; welcome</title>"));
        assert!(xml.contains("<pubDate>Sat, 01 Jun 2024 12:00:00 GMT</pubDate>"));
        assert!(xml.contains("<category>intro</category>"));
        assert!(xml.contains("/posts/hello-welcome</link>"));
    }

    #[test]
    fn feed_without_posts_is_still_a_valid_channel() {
        let xml = render_feed(&tenant(), &[]);

        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<language>en-us</language>"));
        assert!(!xml.contains("<item>"));
    }
}
