// Pure text helpers: slugs, HTML sanitization, feed escaping.
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

/// Subdomain names a blog can never claim.
pub const RESERVED_SLUGS: &[&str] = &[
    "www",
    "admin",
    "api",
    "app",
    "blog",
    "help",
    "support",
    "about",
    "contact",
    "privacy",
    "terms",
    "login",
    "register",
    "dashboard",
    "settings",
    "profile",
    "account",
    "billing",
    "docs",
    "documentation",
];

pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Tenant slug rules: 3-50 chars of [a-z0-9-], no leading/trailing or
/// doubled hyphen.
pub fn is_valid_slug_format(slug: &str) -> bool {
    let slug = slug.trim();
    if slug.len() < 3 || slug.len() > 50 {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
}

/// Up to three numbered alternatives for a taken slug, trying `-1` through
/// `-5` and keeping the ones `available` accepts.
pub fn slug_suggestions(base: &str, available: impl Fn(&str) -> bool) -> Vec<String> {
    let base = base.trim().to_lowercase();
    (1..6)
        .map(|i| format!("{base}-{i}"))
        .filter(|candidate| available(candidate))
        .take(3)
        .collect()
}

/// Turns a title into a URL slug: lowercase, drop everything outside
/// [a-z0-9 -], whitespace to hyphens, collapse runs, trim edges, cap at
/// 50 chars. Empty input falls back to a random `post-` slug.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.to_lowercase().chars() {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            Some(c)
        } else if c.is_whitespace() || c == '-' {
            Some('-')
        } else {
            None
        };
        if let Some(c) = mapped {
            if c == '-' {
                if !last_hyphen {
                    slug.push('-');
                    last_hyphen = true;
                }
            } else {
                slug.push(c);
                last_hyphen = false;
            }
        }
    }
    let slug = slug.trim_matches('-');
    let slug: String = slug.chars().take(50).collect();
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        random_post_slug()
    } else {
        slug
    }
}

fn random_post_slug() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| {
            let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    format!("post-{suffix}")
}

/// Resolves a slug collision by appending `-1`, `-2`, ... until `taken`
/// stops matching.
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

static SCRIPT_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static JS_PROTOCOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").unwrap());
static EVENT_HANDLERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s*on\w+\s*=\s*['"][^'"]*['"]?"#).unwrap());
static STYLE_ATTRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s*style\s*=\s*['"][^'"]*['"]?"#).unwrap());
static DANGEROUS_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:object|embed|applet|iframe|frame|frameset|meta|link|base)[^>]*>")
        .unwrap()
});
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strips scripting vectors from post HTML while leaving normal markup.
pub fn sanitize_html(html: &str) -> String {
    let html = SCRIPT_TAGS.replace_all(html, "");
    let html = JS_PROTOCOL.replace_all(&html, "");
    let html = EVENT_HANDLERS.replace_all(&html, "");
    let html = STYLE_ATTRS.replace_all(&html, "");
    let html = DANGEROUS_TAGS.replace_all(&html, "");
    WHITESPACE_RUNS.replace_all(&html, " ").trim().to_string()
}

/// Comments allow no markup at all: drop tags, collapse whitespace.
pub fn sanitize_comment(body: &str) -> String {
    let body = ANY_TAG.replace_all(body.trim(), "");
    WHITESPACE_RUNS.replace_all(&body, " ").to_string()
}

/// Minimal escaping for text nodes in the RSS feed.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Estimated minutes to read, at 200 words per minute, never below 1.
pub fn read_time_minutes(content: &str) -> u32 {
    let plain = ANY_TAG.replace_all(content, "");
    let words = plain.split_whitespace().count();
    ((words as f64 / 200.0).ceil() as u32).max(1)
}

/// Canonical tag form: lowercase, trimmed, inner whitespace to hyphens.
pub fn normalize_tag(tag: &str) -> String {
    WHITESPACE_RUNS
        .replace_all(tag.trim(), "-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_format_rules() {
        assert!(is_valid_slug_format("my-blog-42"));
        assert!(!is_valid_slug_format("ab"));
        assert!(!is_valid_slug_format("-leading"));
        assert!(!is_valid_slug_format("trailing-"));
        assert!(!is_valid_slug_format("dou--ble"));
        assert!(!is_valid_slug_format("Upper-Case"));
        assert!(!is_valid_slug_format(&"a".repeat(51)));
        assert!(is_valid_slug_format(&"a".repeat(50)));
    }

    #[test]
    fn reserved_slugs_are_blocked() {
        assert!(is_reserved_slug("admin"));
        assert!(is_reserved_slug("www"));
        assert!(!is_reserved_slug("my-blog"));
    }

    #[test]
    fn suggestions_keep_first_three_available() {
        // -2 is taken, so we get -1, -3, -4 and never reach -5.
        let suggestions = slug_suggestions("travel", |s| s != "travel-2");
        assert_eq!(suggestions, vec!["travel-1", "travel-3", "travel-4"]);

        let none = slug_suggestions("travel", |_| false);
        assert!(none.is_empty());
    }

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & Tokio: async IO  "), "rust-tokio-async-io");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn slugify_caps_at_fifty_chars() {
        let long = "word ".repeat(30);
        let slug = slugify(&long);
        assert!(slug.len() <= 50);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slugify_falls_back_on_empty() {
        let slug = slugify("!!!???");
        assert!(slug.starts_with("post-"));
        assert_eq!(slug.len(), "post-".len() + 8);
    }

    #[test]
    fn unique_slug_counts_up() {
        assert_eq!(unique_slug("hello", |_| false), "hello");
        assert_eq!(
            unique_slug("hello", |s| s == "hello" || s == "hello-1"),
            "hello-2"
        );
    }

    #[test]
    fn sanitize_html_removes_vectors() {
        let dirty = r#"<p onclick="evil()">Hi</p><script>alert(1)</script><iframe src="x"></iframe>"#;
        let clean = sanitize_html(dirty);
        assert!(!clean.contains("script"));
        assert!(!clean.contains("onclick"));
        assert!(!clean.contains("iframe"));
        assert!(clean.contains("<p>Hi</p>"));
    }

    #[test]
    fn sanitize_html_strips_js_protocol_and_styles() {
        let dirty = r#"<a href="javascript:alert(1)" style="color:red">x</a>"#;
        let clean = sanitize_html(dirty);
        assert!(!clean.to_lowercase().contains("javascript:"));
        assert!(!clean.contains("style="));
    }

    #[test]
    fn sanitize_comment_strips_all_markup() {
        assert_eq!(
            sanitize_comment("  <b>Nice</b>   post!\n\nThanks  "),
            "Nice post! Thanks"
        );
    }

    #[test]
    fn xml_escaping() {
        assert_eq!(
            escape_xml(r#"<a href="x">Q&A's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Q&amp;A&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn read_time_never_below_one_minute() {
        assert_eq!(read_time_minutes(""), 1);
        assert_eq!(read_time_minutes("<p>short</p>"), 1);
        let long = "word ".repeat(401);
        assert_eq!(read_time_minutes(&long), 3);
    }

    #[test]
    fn tag_normalization() {
        assert_eq!(normalize_tag("  Rust  Lang "), "rust-lang");
        assert_eq!(normalize_tag("WebDev"), "webdev");
    }
}
