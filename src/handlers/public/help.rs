use axum::extract::Path;
use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::ApiError;

/// GET /api/public/help/seo - the static help-center catalog shown next
/// to the SEO settings screens.
pub async fn seo_help() -> Json<Value> {
    let categories = help_categories();
    let total: usize = categories
        .iter()
        .map(|category| category["articles"].as_array().map_or(0, Vec::len))
        .sum();

    Json(json!({
        "categories": categories,
        "totalArticles": total,
    }))
}

/// GET /api/public/help/articles/:slug
pub async fn article(Path(slug): Path<String>) -> Result<Json<Value>, ApiError> {
    let content =
        article_content(&slug).ok_or_else(|| ApiError::not_found("Article not found"))?;

    Ok(Json(json!({
        "slug": slug,
        "content": content,
        "lastUpdated": Utc::now(),
    })))
}

fn help_categories() -> Vec<Value> {
    vec![
        category(
            "seo-basics",
            "SEO Fundamentals",
            "Search",
            "text-blue-600 bg-blue-50 dark:bg-blue-900/20",
            vec![
                entry(
                    "Meta Title Optimization",
                    "Write compelling titles under 60 characters",
                    "meta-title",
                ),
                entry(
                    "Meta Description Best Practices",
                    "Create engaging descriptions that drive clicks",
                    "meta-description",
                ),
                entry(
                    "Keyword Research & Strategy",
                    "Find and target the right keywords",
                    "keywords",
                ),
                entry(
                    "Search Engine Indexing",
                    "Control how search engines crawl your site",
                    "indexing",
                ),
            ],
        ),
        category(
            "social-media",
            "Social Media Optimization",
            "Globe",
            "text-green-600 bg-green-50 dark:bg-green-900/20",
            vec![
                entry(
                    "Open Graph Setup",
                    "Optimize Facebook and LinkedIn sharing",
                    "open-graph",
                ),
                entry(
                    "Twitter Cards Configuration",
                    "Create rich Twitter previews",
                    "twitter-cards",
                ),
                entry(
                    "Social Media Images",
                    "Optimal image sizes and formats",
                    "social-images",
                ),
                entry(
                    "Social Sharing Best Practices",
                    "Maximize engagement and reach",
                    "social-best-practices",
                ),
            ],
        ),
        category(
            "technical-seo",
            "Technical SEO",
            "Settings",
            "text-purple-600 bg-purple-50 dark:bg-purple-900/20",
            vec![
                entry(
                    "Structured Data & Schema",
                    "Rich snippets and search features",
                    "structured-data",
                ),
                entry(
                    "Canonical URLs",
                    "Prevent duplicate content issues",
                    "canonical-urls",
                ),
                entry(
                    "XML Sitemaps",
                    "Help search engines discover content",
                    "sitemaps",
                ),
                entry(
                    "Page Speed Optimization",
                    "Improve loading times for better rankings",
                    "page-speed",
                ),
            ],
        ),
    ]
}

fn category(id: &str, title: &str, icon: &str, color: &str, articles: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": title,
        "icon": icon,
        "color": color,
        "articles": articles,
    })
}

fn entry(title: &str, description: &str, slug: &str) -> Value {
    json!({
        "title": title,
        "description": description,
        "slug": slug,
    })
}

/// Only the articles with written content resolve; the rest of the
/// catalog 404s until the copy exists.
fn article_content(slug: &str) -> Option<&'static str> {
    match slug {
        "meta-title" => Some(
            "# Meta Title Optimization\n\nYour meta title is the first thing users see in search results. Keep it under 60 characters and include your primary keyword near the beginning.\n\n## Best Practices:\n- Include your main keyword\n- Keep it under 60 characters\n- Make it compelling and clickable\n- Avoid keyword stuffing",
        ),
        "meta-description" => Some(
            "# Meta Description Best Practices\n\nMeta descriptions appear below your title in search results. They should be 150-160 characters and provide a compelling summary of your content.\n\n## Tips:\n- Write a compelling summary\n- Include a call-to-action\n- Use your target keywords naturally\n- Keep it between 150-160 characters",
        ),
        "open-graph" => Some(
            "# Open Graph Setup\n\nOpen Graph tags control how your content appears when shared on Facebook, LinkedIn, and other social platforms.\n\n## Required Tags:\n- og:title\n- og:description\n- og:image (1200x630px recommended)\n- og:url\n- og:type",
        ),
        "twitter-cards" => Some(
            "# Twitter Cards Configuration\n\nTwitter Cards provide rich previews when your content is shared on Twitter.\n\n## Card Types:\n- Summary Card: Basic preview with small image\n- Summary Large Image: Featured image preview\n- App Card: Mobile app promotion\n- Player Card: Video/audio content",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_total_counts_every_article() {
        let categories = help_categories();
        let total: usize = categories
            .iter()
            .map(|category| category["articles"].as_array().unwrap().len())
            .sum();
        assert_eq!(categories.len(), 3);
        assert_eq!(total, 12);
    }

    #[test]
    fn article_lookup_is_exact() {
        assert!(article_content("meta-title")
            .unwrap()
            .starts_with("# Meta Title Optimization"));
        assert!(article_content("META-TITLE").is_none());
        assert!(article_content("missing").is_none());
    }
}
