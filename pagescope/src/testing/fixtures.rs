//! HTML fixtures.

use crate::document::extract_title;
use crate::fetch::FetchResult;

/// Title of [`sample_page`].
pub const SAMPLE_TITLE: &str = "Sample Page";

/// A small page: `.x` holds two links, `#gallery` one image, three `li`s.
#[must_use]
pub fn sample_page() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>Sample Page</title></head>
<body>
  <h1>Welcome</h1>
  <div class="x">
    <p>Intro text</p>
    <a href="/first">First</a>
    <a href="/second">Second</a>
  </div>
  <div id="gallery"><img src="/cat.png" alt="Cat"></div>
  <ul>
    <li>one</li>
    <li>two</li>
    <li>three</li>
  </ul>
</body>
</html>"#
        .to_string()
}

/// A page whose `nav` holds `count` links.
#[must_use]
pub fn link_list_page(count: usize) -> String {
    let links: String = (1..=count)
        .map(|i| format!(r#"<a href="/page/{i}">Page {i}</a>"#))
        .collect();
    format!("<html><head><title>Links</title></head><body><nav>{links}</nav></body></html>")
}

/// A page whose `section` holds `count` images.
#[must_use]
pub fn gallery_page(count: usize) -> String {
    let images: String = (1..=count)
        .map(|i| format!(r#"<img src="/img/{i}.jpg" alt="Image {i}">"#))
        .collect();
    format!("<html><head><title>Gallery</title></head><body><section>{images}</section></body></html>")
}

/// A successful fetch of `html` from `url`.
#[must_use]
pub fn fetch_result(url: &str, html: &str) -> FetchResult {
    FetchResult {
        raw_html: html.to_string(),
        title: extract_title(html),
        final_url: url.to_string(),
        status_code: 200,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentModel;

    #[test]
    fn test_sample_page_shape() {
        let doc = DocumentModel::parse(&sample_page());
        assert_eq!(doc.title(), SAMPLE_TITLE);
        assert_eq!(doc.select(".x a").unwrap().len(), 2);
        assert_eq!(doc.select("li").unwrap().len(), 3);
        assert_eq!(doc.select("#gallery img").unwrap().len(), 1);
    }

    #[test]
    fn test_generated_pages() {
        let doc = DocumentModel::parse(&link_list_page(8));
        assert_eq!(doc.select("nav a").unwrap().len(), 8);

        let result = fetch_result("https://g.test", &gallery_page(4));
        assert_eq!(result.title, "Gallery");
        assert_eq!(DocumentModel::parse(&result.raw_html).select("img").unwrap().len(), 4);
    }
}
